#![allow(dead_code)]

use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use surgery_core::clock::SimTime;
use surgery_core::error::SimError;
use surgery_core::runner::{run_next_event, run_until, run_until_end, simulation_schedule};

/// Helper that owns a reusable `Schedule` so tests can step or drain the event queue.
pub struct ScheduleRunner {
    schedule: Schedule,
}

impl Default for ScheduleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRunner {
    /// Create a runner with the default simulation schedule.
    pub fn new() -> Self {
        Self {
            schedule: simulation_schedule(),
        }
    }

    /// Run a single event (returns `true` if an event was processed).
    pub fn run_one(&mut self, world: &mut World) -> bool {
        run_next_event(world, &mut self.schedule).expect("simulation step")
    }

    /// Process every event up to and including `end`.
    pub fn run_until(&mut self, world: &mut World, end: SimTime) -> u64 {
        run_until(world, &mut self.schedule, end).expect("simulation run")
    }

    /// Drive the simulation to the configured end of the run.
    pub fn run_full(&mut self, world: &mut World) -> u64 {
        run_until_end(world, &mut self.schedule).expect("simulation run")
    }

    /// Drive the simulation to the end, surfacing any fault.
    pub fn try_run_full(&mut self, world: &mut World) -> Result<u64, SimError> {
        run_until_end(world, &mut self.schedule)
    }
}
