//! Two-level fractional factorial design over six surgery-unit factors.
//!
//! The 2^(6-3) design runs 8 points: A, B and C form a full 2^3 factorial and
//! the remaining factors follow the generators D = ABC, E = AB, F = CD.

use serde::Serialize;
use surgery_core::distributions::DurationDistribution;
use surgery_core::{QueueSampling, SimulationConfig};

use crate::error::ExperimentError;
use crate::metrics::{metric_samples, Metric};
use crate::runner::{run_replications_with_progress, ReplicationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Factor {
    Interarrival,
    PrepTime,
    RecoveryTime,
    PrepBays,
    RecoveryBeds,
    Priority,
}

impl Factor {
    pub const ALL: [Factor; 6] = [
        Factor::Interarrival,
        Factor::PrepTime,
        Factor::RecoveryTime,
        Factor::PrepBays,
        Factor::RecoveryBeds,
        Factor::Priority,
    ];

    pub fn letter(&self) -> char {
        match self {
            Factor::Interarrival => 'A',
            Factor::PrepTime => 'B',
            Factor::RecoveryTime => 'C',
            Factor::PrepBays => 'D',
            Factor::RecoveryBeds => 'E',
            Factor::Priority => 'F',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Factor::Interarrival => "interarrival",
            Factor::PrepTime => "prep_time",
            Factor::RecoveryTime => "recovery_time",
            Factor::PrepBays => "prep_bays",
            Factor::RecoveryBeds => "recovery_beds",
            Factor::Priority => "priority",
        }
    }

    fn index(&self) -> usize {
        match self {
            Factor::Interarrival => 0,
            Factor::PrepTime => 1,
            Factor::RecoveryTime => 2,
            Factor::PrepBays => 3,
            Factor::RecoveryBeds => 4,
            Factor::Priority => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn sign(&self) -> i8 {
        match self {
            Level::Low => -1,
            Level::High => 1,
        }
    }

    fn from_sign(sign: i8) -> Self {
        if sign > 0 {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// One row of the design matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DesignPoint {
    pub run: usize,
    pub levels: [Level; 6],
}

impl DesignPoint {
    pub fn level(&self, factor: Factor) -> Level {
        self.levels[factor.index()]
    }

    /// `base` with every factor set to this point's level.
    ///
    /// | Factor | Low | High |
    /// |---|---|---|
    /// | A interarrival | exp(25) | exp(22.5) |
    /// | B prep time | exp(40) | uniform(30, 50) |
    /// | C recovery time | exp(40) | uniform(30, 50) |
    /// | D prep bays | 4 | 5 |
    /// | E recovery beds | 4 | 5 |
    /// | F priority | FIFO, no emergencies | priority, 20% emergencies |
    pub fn apply(&self, base: &SimulationConfig) -> SimulationConfig {
        let high = |factor| self.level(factor) == Level::High;
        let service = |factor| {
            if high(factor) {
                DurationDistribution::uniform(30.0, 50.0)
            } else {
                DurationDistribution::exponential(40.0)
            }
        };
        let prep_bays = if high(Factor::PrepBays) { 5 } else { 4 };
        let recovery_beds = if high(Factor::RecoveryBeds) { 5 } else { 4 };

        let mut config = base
            .clone()
            .with_interarrival(DurationDistribution::exponential(
                if high(Factor::Interarrival) { 22.5 } else { 25.0 },
            ))
            .with_prep_time(service(Factor::PrepTime))
            .with_recovery_time(service(Factor::RecoveryTime))
            .with_capacities(prep_bays, base.operating_rooms, recovery_beds);
        if high(Factor::Priority) {
            config = config.with_emergency_priority(0.2);
        } else {
            config.priority_scheduling = false;
            config.emergency_probability = 0.0;
        }
        config
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FactorialDesign {
    pub points: Vec<DesignPoint>,
}

impl FactorialDesign {
    /// The 8-run 2^(6-3) design with D = ABC, E = AB, F = CD.
    pub fn fractional_2_6_3() -> Self {
        let points = (0..8)
            .map(|run| {
                let bit = |mask: usize| if run & mask != 0 { 1i8 } else { -1 };
                let (a, b, c) = (bit(4), bit(2), bit(1));
                let d = a * b * c;
                let e = a * b;
                let f = c * d;
                DesignPoint {
                    run,
                    levels: [a, b, c, d, e, f].map(Level::from_sign),
                }
            })
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A base configuration suited to the design: 5000 minutes with a 1000 minute
/// warmup and a queue sample at every arrival.
pub fn default_base() -> SimulationConfig {
    SimulationConfig::default()
        .with_run_duration(5000.0, 1000.0)
        .with_queue_sampling(QueueSampling::OnArrival)
}

#[derive(Debug, Clone, Serialize)]
pub struct DesignResult {
    pub point: DesignPoint,
    pub replications: Vec<ReplicationResult>,
}

impl DesignResult {
    /// Mean of `metric` over this point's replications; `None` if no
    /// replication has it.
    pub fn response(&self, metric: Metric) -> Option<f64> {
        let samples = metric_samples(&self.replications, metric);
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }
}

/// Replicate every design point. All points share `base.seed`, so
/// replication `i` of each point uses the same random stream.
pub fn run_design(
    design: &FactorialDesign,
    base: &SimulationConfig,
    replications: usize,
    num_threads: Option<usize>,
) -> Result<Vec<DesignResult>, ExperimentError> {
    design
        .points
        .iter()
        .map(|point| {
            let config = point.apply(base);
            let results =
                run_replications_with_progress(&config, replications, num_threads, false)?;
            Ok(DesignResult {
                point: *point,
                replications: results,
            })
        })
        .collect()
}

/// Main effect of each factor on `metric`: mean response at the high level
/// minus mean response at the low level. Points without a response are skipped.
pub fn main_effects(results: &[DesignResult], metric: Metric) -> Vec<(Factor, f64)> {
    let responses: Vec<(DesignPoint, f64)> = results
        .iter()
        .filter_map(|r| r.response(metric).map(|value| (r.point, value)))
        .collect();

    Factor::ALL
        .iter()
        .map(|&factor| {
            let side = |level: Level| {
                let values: Vec<f64> = responses
                    .iter()
                    .filter(|(point, _)| point.level(factor) == level)
                    .map(|(_, value)| *value)
                    .collect();
                if values.is_empty() {
                    0.0
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                }
            };
            (factor, side(Level::High) - side(Level::Low))
        })
        .collect()
}
