//! Error taxonomy for the surgery unit simulation.
//!
//! Configuration problems are rejected before anything is scheduled. Logic
//! faults abort the run on the step where they are detected. A run that
//! produced no post-warmup data is reported as [`SimError::NoData`] so callers
//! aggregating replications can tell it apart from a run with zero-valued metrics.

use bevy_ecs::prelude::Entity;
use thiserror::Error;

use crate::clock::{EventKind, SimTime};
use crate::pools::PoolKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{pool} capacity must be positive")]
    ZeroCapacity { pool: PoolKind },

    #[error("{name} distribution has invalid parameters: {reason}")]
    InvalidDistribution { name: &'static str, reason: String },

    #[error("run duration must be positive and finite, got {0}")]
    InvalidRunDuration(SimTime),

    #[error("warmup {warmup} must be non-negative and shorter than run duration {run_duration}")]
    InvalidWarmup {
        warmup: SimTime,
        run_duration: SimTime,
    },

    #[error("emergency probability must lie in [0, 1], got {0}")]
    InvalidEmergencyProbability(f64),

    #[error("queue sampling interval must be positive and finite, got {0}")]
    InvalidSamplingInterval(SimTime),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationFault {
    #[error("cannot schedule {kind:?} at {at}: clock is already at {now}")]
    ScheduledInPast {
        kind: EventKind,
        at: SimTime,
        now: SimTime,
    },

    #[error("cannot schedule {kind:?} at non-finite time {at}")]
    NonFiniteTime { kind: EventKind, at: SimTime },

    #[error("patient {patient:?} released a {pool} it does not hold")]
    ReleaseNotHeld { pool: PoolKind, patient: Entity },

    #[error("patient {patient:?} was resumed for a {pool} it does not hold")]
    GrantNotHeld { pool: PoolKind, patient: Entity },

    #[error("patient {patient:?} requested a {pool} it already holds or waits for")]
    DuplicateRequest { pool: PoolKind, patient: Entity },

    #[error("{kind:?} event carries no patient subject")]
    MissingSubject { kind: EventKind },

    #[error("patient entity {0:?} does not exist")]
    UnknownPatient(Entity),

    #[error("patient {0:?} left recovery with missing stage timestamps")]
    IncompleteTiming(Entity),

    #[error("patient {patient:?} received {kind:?} while in stage {stage}")]
    UnexpectedStage {
        patient: Entity,
        kind: EventKind,
        stage: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("simulation fault: {0}")]
    Fault(#[from] SimulationFault),

    #[error("no completed patients after the warmup cutoff at {warmup}")]
    NoData { warmup: SimTime },
}

pub type Result<T> = std::result::Result<T, SimError>;
