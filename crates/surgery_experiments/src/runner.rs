//! Parallel replication execution using rayon.
//!
//! Each replication builds its own [Simulation], so nothing is shared between
//! workers and results do not depend on scheduling across threads.

use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use rayon::prelude::*;
use serde::Serialize;
use surgery_core::telemetry::QueueSample;
use surgery_core::{SimError, SimStatistics, Simulation, SimulationConfig};

use crate::error::ExperimentError;

/// Outcome of one independent run.
#[derive(Debug, Clone, Serialize)]
pub struct ReplicationResult {
    /// Position in the batch, starting at 0.
    pub replication: usize,
    pub seed: u64,
    pub completed_patients: usize,
    /// `None` when no patient passed the warmup filter.
    pub statistics: Option<SimStatistics>,
    /// Raw queue-length series, kept for serial-correlation analysis.
    #[serde(skip)]
    pub queue_samples: Vec<QueueSample>,
}

impl ReplicationResult {
    pub fn has_data(&self) -> bool {
        self.statistics.is_some()
    }
}

/// Seed used by replication `replication` of a batch based on `config`.
pub fn replication_seed(config: &SimulationConfig, replication: usize) -> u64 {
    config.seed.wrapping_add(replication as u64)
}

/// Run one replication of `config` with seed `config.seed + replication`.
///
/// A run with no post-warmup data is not an error: it comes back with
/// `statistics: None`. Any other failure is returned.
pub fn run_single_replication(
    config: &SimulationConfig,
    replication: usize,
) -> Result<ReplicationResult, SimError> {
    let seed = replication_seed(config, replication);
    let mut simulation = Simulation::new(config.clone().with_seed(seed))?;
    let completed_patients = simulation.run()?.len();

    let statistics = match simulation.statistics() {
        Ok(stats) => Some(stats),
        Err(SimError::NoData { warmup }) => {
            warn!("replication {replication} (seed {seed}) has no patients after warmup {warmup}");
            None
        }
        Err(err) => return Err(err),
    };

    Ok(ReplicationResult {
        replication,
        seed,
        completed_patients,
        statistics,
        queue_samples: simulation.queue_samples().to_vec(),
    })
}

/// Run `count` replications in parallel.
///
/// # Arguments
///
/// * `config` - Base configuration; replication `i` uses seed `config.seed + i`
/// * `count` - Number of replications
/// * `num_threads` - Optional number of threads to use. If None, uses rayon's default.
///
/// # Returns
///
/// Results in replication order, or the first failure.
pub fn run_replications(
    config: &SimulationConfig,
    count: usize,
    num_threads: Option<usize>,
) -> Result<Vec<ReplicationResult>, ExperimentError> {
    run_replications_with_progress(config, count, num_threads, true)
}

/// [run_replications] with an optional progress bar.
pub fn run_replications_with_progress(
    config: &SimulationConfig,
    count: usize,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<ReplicationResult>, ExperimentError> {
    let pb = if show_progress && count > 0 {
        let bar = ProgressBar::new(count as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Some(bar)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    let pb_clone = pb.clone();
    let results = pool.install(|| {
        (0..count)
            .into_par_iter()
            .map(|replication| {
                let result = run_single_replication(config, replication)
                    .map_err(|source| ExperimentError::Replication {
                        replication,
                        source,
                    });
                if let Some(ref progress_bar) = pb_clone {
                    progress_bar.inc(1);
                }
                result
            })
            .collect::<Result<Vec<_>, _>>()
    });

    if let Some(ref progress_bar) = pb {
        progress_bar.finish_with_message("Completed");
    }

    results
}
