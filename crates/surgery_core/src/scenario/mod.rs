//! Scenario setup: validate a [SimulationConfig] and build a fresh world for one run.

mod build;
mod params;

pub use build::{build_scenario, initialize_simulation};
pub use params::{QueueSampling, SimulationConfig, SimulationEndTime};
