//! Probability distributions for interarrival and service times.
//!
//! Every draw in a run comes from the single [`SimRng`] resource, seeded once
//! per run, so a fixed seed reproduces the run exactly as long as the draws
//! happen in the same order.

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Exp1;
use serde::{Deserialize, Serialize};

use crate::clock::SimTime;
use crate::error::ConfigError;

/// Duration distribution in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DurationDistribution {
    Exponential { mean: SimTime },
    Uniform { min: SimTime, max: SimTime },
}

impl DurationDistribution {
    pub fn exponential(mean: SimTime) -> Self {
        Self::Exponential { mean }
    }

    pub fn uniform(min: SimTime, max: SimTime) -> Self {
        Self::Uniform { min, max }
    }

    /// Expected value of a draw.
    pub fn mean(&self) -> SimTime {
        match *self {
            Self::Exponential { mean } => mean,
            Self::Uniform { min, max } => (min + max) / 2.0,
        }
    }

    /// Reject parameters that could yield non-positive or undefined durations.
    /// `name` identifies the distribution in the error.
    pub fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidDistribution { name, reason };
        match *self {
            Self::Exponential { mean } => {
                if !(mean.is_finite() && mean > 0.0) {
                    return Err(invalid(format!("exponential mean {mean} is not positive")));
                }
            }
            Self::Uniform { min, max } => {
                if !(min.is_finite() && max.is_finite()) {
                    return Err(invalid(format!("uniform bounds [{min}, {max}] are not finite")));
                }
                if min <= 0.0 {
                    return Err(invalid(format!("uniform minimum {min} is not positive")));
                }
                if min > max {
                    return Err(invalid(format!("uniform minimum {min} exceeds maximum {max}")));
                }
            }
        }
        Ok(())
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SimTime {
        match *self {
            Self::Exponential { mean } => {
                let unit: f64 = rng.sample(Exp1);
                unit * mean
            }
            Self::Uniform { min, max } => rng.gen_range(min..=max),
        }
    }
}

/// The run's only source of randomness.
#[derive(Debug, Resource)]
pub struct SimRng(StdRng);

impl SimRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn sample(&mut self, distribution: &DurationDistribution) -> SimTime {
        distribution.sample(&mut self.0)
    }

    /// Bernoulli draw; `probability` must already be validated to lie in [0, 1].
    pub fn chance(&mut self, probability: f64) -> bool {
        self.0.gen_bool(probability)
    }
}
