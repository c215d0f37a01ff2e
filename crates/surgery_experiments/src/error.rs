use surgery_core::SimError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("replication {replication} failed: {source}")]
    Replication {
        replication: usize,
        #[source]
        source: SimError,
    },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
