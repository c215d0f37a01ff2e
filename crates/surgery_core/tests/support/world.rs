#![allow(dead_code)]

use bevy_ecs::prelude::World;
use surgery_core::clock::{EventKind, EventSubject, SimTime, SimulationClock};
use surgery_core::distributions::DurationDistribution;
use surgery_core::scenario::{build_scenario, initialize_simulation, SimulationConfig};
use surgery_core::test_helpers::{deterministic_config, fixed};

/// Helper that populates the ECS world with every resource a run needs.
#[derive(Debug, Clone)]
pub struct TestWorldBuilder {
    config: SimulationConfig,
    start: bool,
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self {
            config: deterministic_config(),
            start: true,
        }
    }
}

impl TestWorldBuilder {
    /// Create a new builder with the constant-duration configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an explicit configuration.
    pub fn from_config(config: SimulationConfig) -> Self {
        Self {
            config,
            start: true,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn with_capacities(mut self, prep: usize, operating: usize, recovery: usize) -> Self {
        self.config = self.config.with_capacities(prep, operating, recovery);
        self
    }

    /// Constant stage durations in minutes.
    pub fn with_fixed_durations(
        mut self,
        interarrival: SimTime,
        prep: SimTime,
        surgery: SimTime,
        recovery: SimTime,
    ) -> Self {
        self.config = self
            .config
            .with_interarrival(fixed(interarrival))
            .with_prep_time(fixed(prep))
            .with_surgery_time(fixed(surgery))
            .with_recovery_time(fixed(recovery));
        self
    }

    pub fn with_interarrival(mut self, distribution: DurationDistribution) -> Self {
        self.config = self.config.with_interarrival(distribution);
        self
    }

    pub fn with_run_duration(mut self, run_duration: SimTime, warmup: SimTime) -> Self {
        self.config = self.config.with_run_duration(run_duration, warmup);
        self
    }

    pub fn with_priority(mut self, enabled: bool) -> Self {
        self.config.priority_scheduling = enabled;
        self
    }

    /// Leave the clock empty instead of scheduling the start event, for tests
    /// that place patients and events by hand.
    pub fn without_generator(mut self) -> Self {
        self.start = false;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Build the ECS world with the configured resources.
    pub fn build(self) -> World {
        let mut world = World::new();
        build_scenario(&mut world, self.config).expect("test config should be valid");
        if self.start {
            initialize_simulation(&mut world).expect("start event");
        }
        world
    }
}

/// Schedule `kind` for `patient` at `at` on the world's clock.
pub fn schedule_for(world: &mut World, at: SimTime, kind: EventKind, patient: bevy_ecs::prelude::Entity) {
    world
        .resource_mut::<SimulationClock>()
        .schedule_at(at, kind, Some(EventSubject::Patient(patient)))
        .expect("schedule");
}
