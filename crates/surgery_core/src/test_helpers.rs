//! Test helpers for common test setup and utilities.
//!
//! Shared by unit tests, integration tests and benches so fixtures stay consistent.

use bevy_ecs::prelude::{Entity, World};

use crate::clock::SimTime;
use crate::distributions::DurationDistribution;
use crate::ecs::{Patient, PatientClass, PatientStage, PatientTiming};
use crate::scenario::{build_scenario, initialize_simulation, SimulationConfig};

/// A distribution that always yields `minutes`.
pub fn fixed(minutes: SimTime) -> DurationDistribution {
    DurationDistribution::uniform(minutes, minutes)
}

/// A configuration whose every duration is constant, so event times can be
/// worked out by hand: arrivals every 10, prep 20, surgery 15, recovery 30.
pub fn deterministic_config() -> SimulationConfig {
    SimulationConfig::default()
        .with_interarrival(fixed(10.0))
        .with_prep_time(fixed(20.0))
        .with_surgery_time(fixed(15.0))
        .with_recovery_time(fixed(30.0))
}

/// The reference scenario: capacities 3/1/3, exponential means 25/40/20/40,
/// 1000 minutes with a 200 minute warmup, seed 42.
pub fn reference_config() -> SimulationConfig {
    SimulationConfig::default()
}

/// Build a world for `config` with the start event already scheduled.
///
/// # Panics
///
/// Panics if `config` is invalid.
pub fn create_test_world(config: SimulationConfig) -> World {
    let mut world = World::new();
    build_scenario(&mut world, config).expect("test config should be valid");
    initialize_simulation(&mut world).expect("fresh clock accepts the start event");
    world
}

/// Builder for patient fixtures placed at an arbitrary point of their lifecycle.
#[derive(Clone, Debug)]
pub struct PatientBuilder {
    id: u64,
    class: PatientClass,
    stage: PatientStage,
    timing: PatientTiming,
}

impl PatientBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            class: PatientClass::Elective,
            stage: PatientStage::WaitingForPrep,
            timing: PatientTiming::default(),
        }
    }

    pub fn emergency(mut self) -> Self {
        self.class = PatientClass::Emergency;
        self
    }

    pub fn with_stage(mut self, stage: PatientStage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_timing(mut self, timing: PatientTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn arrived_at(mut self, arrival: SimTime) -> Self {
        self.timing.arrival = arrival;
        self
    }

    pub fn spawn(self, world: &mut World) -> Entity {
        world
            .spawn((
                Patient {
                    id: self.id,
                    class: self.class,
                    stage: self.stage,
                    prep_queue_on_arrival: 0,
                },
                self.timing,
            ))
            .id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_distribution_is_constant() {
        let distribution = fixed(12.5);
        assert_eq!(distribution.mean(), 12.5);
        assert!(distribution.validate("fixed").is_ok());
    }

    #[test]
    fn patient_builder_spawns_components() {
        let mut world = World::new();
        let entity = PatientBuilder::new(3)
            .emergency()
            .with_stage(PatientStage::InPrep)
            .arrived_at(4.0)
            .spawn(&mut world);

        let patient = world.get::<Patient>(entity).expect("patient");
        assert_eq!(patient.id, 3);
        assert_eq!(patient.class, PatientClass::Emergency);
        assert_eq!(patient.stage, PatientStage::InPrep);
        assert_eq!(world.get::<PatientTiming>(entity).expect("timing").arrival, 4.0);
    }
}
