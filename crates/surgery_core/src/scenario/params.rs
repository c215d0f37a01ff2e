use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::clock::SimTime;
use crate::distributions::DurationDistribution;
use crate::error::ConfigError;
use crate::pools::PoolKind;

/// Default spacing between periodic queue-length samples (minutes).
const DEFAULT_SAMPLE_INTERVAL: SimTime = 10.0;

/// End of the run: the runner processes events with timestamp <= this value.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SimulationEndTime(pub SimTime);

/// When preparation waiting-line lengths are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum QueueSampling {
    /// Fixed simulated-time interval, starting at time 0.
    Interval(SimTime),
    /// One sample per patient arrival, taken before the patient joins the line.
    OnArrival,
}

impl Default for QueueSampling {
    fn default() -> Self {
        QueueSampling::Interval(DEFAULT_SAMPLE_INTERVAL)
    }
}

/// Parameters of one run. Read-only once the run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct SimulationConfig {
    pub prep_bays: usize,
    pub operating_rooms: usize,
    pub recovery_beds: usize,
    pub interarrival: DurationDistribution,
    pub prep_time: DurationDistribution,
    pub surgery_time: DurationDistribution,
    pub recovery_time: DurationDistribution,
    /// Probability that an arriving patient is an emergency.
    pub emergency_probability: f64,
    /// Serve emergencies first at preparation bays and operating rooms.
    pub priority_scheduling: bool,
    pub run_duration: SimTime,
    /// Patients finishing recovery before this time are excluded from statistics.
    pub warmup: SimTime,
    pub seed: u64,
    pub queue_sampling: QueueSampling,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            prep_bays: 3,
            operating_rooms: 1,
            recovery_beds: 3,
            interarrival: DurationDistribution::exponential(25.0),
            prep_time: DurationDistribution::exponential(40.0),
            surgery_time: DurationDistribution::exponential(20.0),
            recovery_time: DurationDistribution::exponential(40.0),
            emergency_probability: 0.0,
            priority_scheduling: false,
            run_duration: 1000.0,
            warmup: 200.0,
            seed: 42,
            queue_sampling: QueueSampling::default(),
        }
    }
}

impl SimulationConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Capacities of preparation bays, operating rooms and recovery beds.
    pub fn with_capacities(mut self, prep_bays: usize, operating_rooms: usize, recovery_beds: usize) -> Self {
        self.prep_bays = prep_bays;
        self.operating_rooms = operating_rooms;
        self.recovery_beds = recovery_beds;
        self
    }

    pub fn with_interarrival(mut self, distribution: DurationDistribution) -> Self {
        self.interarrival = distribution;
        self
    }

    pub fn with_prep_time(mut self, distribution: DurationDistribution) -> Self {
        self.prep_time = distribution;
        self
    }

    pub fn with_surgery_time(mut self, distribution: DurationDistribution) -> Self {
        self.surgery_time = distribution;
        self
    }

    pub fn with_recovery_time(mut self, distribution: DurationDistribution) -> Self {
        self.recovery_time = distribution;
        self
    }

    pub fn with_run_duration(mut self, run_duration: SimTime, warmup: SimTime) -> Self {
        self.run_duration = run_duration;
        self.warmup = warmup;
        self
    }

    /// Classify arrivals as emergencies with `probability` and serve them first.
    pub fn with_emergency_priority(mut self, probability: f64) -> Self {
        self.emergency_probability = probability;
        self.priority_scheduling = true;
        self
    }

    pub fn with_queue_sampling(mut self, sampling: QueueSampling) -> Self {
        self.queue_sampling = sampling;
        self
    }

    /// Length of the post-warmup observation window.
    pub fn observation_window(&self) -> SimTime {
        self.run_duration - self.warmup
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (pool, capacity) in [
            (PoolKind::PrepBay, self.prep_bays),
            (PoolKind::OperatingRoom, self.operating_rooms),
            (PoolKind::RecoveryBed, self.recovery_beds),
        ] {
            if capacity == 0 {
                return Err(ConfigError::ZeroCapacity { pool });
            }
        }

        self.interarrival.validate("interarrival")?;
        self.prep_time.validate("preparation")?;
        self.surgery_time.validate("surgery")?;
        self.recovery_time.validate("recovery")?;

        if !(self.run_duration.is_finite() && self.run_duration > 0.0) {
            return Err(ConfigError::InvalidRunDuration(self.run_duration));
        }
        if !(self.warmup.is_finite() && self.warmup >= 0.0 && self.warmup < self.run_duration) {
            return Err(ConfigError::InvalidWarmup {
                warmup: self.warmup,
                run_duration: self.run_duration,
            });
        }
        if !(0.0..=1.0).contains(&self.emergency_probability) {
            return Err(ConfigError::InvalidEmergencyProbability(
                self.emergency_probability,
            ));
        }
        if let QueueSampling::Interval(interval) = self.queue_sampling {
            if !(interval.is_finite() && interval > 0.0) {
                return Err(ConfigError::InvalidSamplingInterval(interval));
            }
        }
        Ok(())
    }
}
