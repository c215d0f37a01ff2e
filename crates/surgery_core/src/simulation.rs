//! One self-contained run: a fresh [World] and schedule per [Simulation], so
//! replications share nothing and can run side by side.

use bevy_ecs::prelude::{Schedule, World};
use log::info;

use crate::clock::{SimTime, SimulationClock};
use crate::error::SimError;
use crate::pools::ResourcePools;
use crate::profiling::EventMetrics;
use crate::runner::{run_until_end, run_until_end_with_hook, simulation_schedule};
use crate::scenario::{build_scenario, initialize_simulation, SimulationConfig};
use crate::statistics::{compute_statistics, SimStatistics};
use crate::telemetry::{BlockingInterval, CompletedPatientRecord, QueueSample, SimTelemetry};

pub struct Simulation {
    world: World,
    schedule: Schedule,
}

impl Simulation {
    /// Validate `config` and build the world. Nothing runs yet.
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        let mut world = World::new();
        build_scenario(&mut world, config)?;
        initialize_simulation(&mut world)?;
        Ok(Self {
            world,
            schedule: simulation_schedule(),
        })
    }

    /// Process every event up to the configured run duration and return the
    /// patients that completed recovery, in completion order.
    pub fn run(&mut self) -> Result<&[CompletedPatientRecord], SimError> {
        self.log_start();
        let steps = run_until_end(&mut self.world, &mut self.schedule)?;
        self.log_finish(steps);
        Ok(self.completed_patients())
    }

    /// [Simulation::run] with `hook` invoked after every processed event.
    pub fn run_with_hook<F>(&mut self, hook: F) -> Result<&[CompletedPatientRecord], SimError>
    where
        F: FnMut(&World, &crate::clock::Event),
    {
        self.log_start();
        let steps = run_until_end_with_hook(&mut self.world, &mut self.schedule, hook)?;
        self.log_finish(steps);
        Ok(self.completed_patients())
    }

    fn log_start(&self) {
        let config = self.config();
        info!(
            "run start: seed={} duration={} warmup={} capacities={}/{}/{}",
            config.seed,
            config.run_duration,
            config.warmup,
            config.prep_bays,
            config.operating_rooms,
            config.recovery_beds
        );
    }

    fn log_finish(&self, steps: u64) {
        let telemetry = self.telemetry();
        info!(
            "run finished at t={:.3}: {} events, {} arrived, {} completed, {:.0} events/s",
            self.now(),
            steps,
            telemetry.patients_arrived,
            telemetry.completed_patients.len(),
            self.world.resource::<EventMetrics>().events_per_second()
        );
    }

    /// Aggregate statistics over patients passing the warmup filter.
    pub fn statistics(&self) -> Result<SimStatistics, SimError> {
        compute_statistics(self.telemetry(), self.config())
    }

    pub fn completed_patients(&self) -> &[CompletedPatientRecord] {
        &self.telemetry().completed_patients
    }

    /// Every queue-length sample of the run, warmup included.
    pub fn queue_samples(&self) -> &[QueueSample] {
        &self.telemetry().queue_samples
    }

    /// Closed blocking intervals plus any still open, truncated at the run end.
    pub fn blocking_intervals(&self) -> Vec<BlockingInterval> {
        self.telemetry()
            .blocking_intervals_until(self.config().run_duration)
    }

    pub fn telemetry(&self) -> &SimTelemetry {
        self.world.resource::<SimTelemetry>()
    }

    pub fn pools(&self) -> &ResourcePools {
        self.world.resource::<ResourcePools>()
    }

    pub fn config(&self) -> &SimulationConfig {
        self.world.resource::<SimulationConfig>()
    }

    pub fn metrics(&self) -> &EventMetrics {
        self.world.resource::<EventMetrics>()
    }

    pub fn now(&self) -> SimTime {
        self.world.resource::<SimulationClock>().now()
    }

    pub fn world(&self) -> &World {
        &self.world
    }
}

/// Run `config` to completion and return the completed patients.
pub fn run(config: SimulationConfig) -> Result<Vec<CompletedPatientRecord>, SimError> {
    let mut simulation = Simulation::new(config)?;
    Ok(simulation.run()?.to_vec())
}

/// Run `config` to completion and return its statistics.
pub fn run_statistics(config: SimulationConfig) -> Result<SimStatistics, SimError> {
    let mut simulation = Simulation::new(config)?;
    simulation.run()?;
    simulation.statistics()
}
