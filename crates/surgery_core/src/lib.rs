//! Discrete-event simulation of a hospital surgery unit.
//!
//! Patients arrive, wait for a preparation bay, an operating room and a
//! recovery bed in turn, and leave. A patient keeps its prep bay until an
//! operating room is free, and keeps the operating room (blocking it) until a
//! recovery bed is free. The engine is a `bevy_ecs` world driven one event at
//! a time by [runner]; [simulation::Simulation] wraps one run end to end.

pub mod clock;
pub mod distributions;
pub mod ecs;
pub mod error;
pub mod pools;
pub mod profiling;
pub mod runner;
pub mod scenario;
pub mod simulation;
pub mod statistics;
pub mod systems;
pub mod telemetry;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use error::{ConfigError, SimError, SimulationFault};
pub use scenario::{QueueSampling, SimulationConfig};
pub use simulation::{run, run_statistics, Simulation};
pub use statistics::{ClassStatistics, SimStatistics};
pub use telemetry::CompletedPatientRecord;
