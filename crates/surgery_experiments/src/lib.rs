//! Replication and comparison layer for the surgery unit simulation.
//!
//! Runs independent replications of a configuration in parallel, summarizes
//! them with confidence intervals, compares configurations with paired-t tests
//! and analyzes serial correlation of the prep queue length.
//!
//! # Quick Start
//!
//! ```no_run
//! use surgery_core::SimulationConfig;
//! use surgery_experiments::{compare_scenarios, run_replications, Metric, ScenarioAnalysis};
//!
//! let base = SimulationConfig::default();
//! let three_beds = run_replications(&base, 20, None)?;
//! let four_beds = run_replications(&base.clone().with_capacities(3, 1, 4), 20, None)?;
//!
//! let analysis = ScenarioAnalysis::from_replications(&three_beds);
//! let diff = compare_scenarios(&three_beds, &four_beds, Metric::OrBlockingProbability);
//! # Ok::<(), surgery_experiments::ExperimentError>(())
//! ```
//!
//! # Architecture
//!
//! - [`runner`]: Parallel replication execution using rayon
//! - [`confidence`]: Student-t intervals and paired comparisons
//! - [`metrics`]: Metric extraction and per-scenario summaries
//! - [`design`]: Two-level fractional factorial design
//! - [`serial`]: Windowed queue series and autocorrelation

pub mod confidence;
pub mod design;
pub mod error;
pub mod metrics;
pub mod runner;
pub mod serial;

pub use confidence::{t_critical_95, ConfidenceInterval, PairedComparison};
pub use design::{main_effects, run_design, DesignPoint, DesignResult, Factor, FactorialDesign, Level};
pub use error::ExperimentError;
pub use metrics::{compare_scenarios, metric_samples, Metric, ScenarioAnalysis};
pub use runner::{run_replications, run_replications_with_progress, run_single_replication, ReplicationResult};
pub use serial::{autocorrelation, lag_correlation, windowed_series};
