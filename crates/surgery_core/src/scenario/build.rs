use bevy_ecs::prelude::World;
use log::debug;

use crate::clock::{EventKind, SimulationClock};
use crate::distributions::SimRng;
use crate::error::{ConfigError, SimulationFault};
use crate::pools::ResourcePools;
use crate::profiling::EventMetrics;
use crate::systems::SimFault;
use crate::telemetry::SimTelemetry;

use super::params::{SimulationConfig, SimulationEndTime};

/// Validates `config` and populates `world` with the clock, pools, RNG,
/// telemetry and configuration resources. Nothing is scheduled on error.
pub fn build_scenario(world: &mut World, config: SimulationConfig) -> Result<(), ConfigError> {
    config.validate()?;

    debug!(
        "building scenario: prep={} or={} recovery={} duration={} warmup={} seed={}",
        config.prep_bays,
        config.operating_rooms,
        config.recovery_beds,
        config.run_duration,
        config.warmup,
        config.seed
    );

    world.insert_resource(SimulationClock::default());
    world.insert_resource(ResourcePools::new(
        config.prep_bays,
        config.operating_rooms,
        config.recovery_beds,
        config.priority_scheduling,
    ));
    world.insert_resource(SimRng::from_seed(config.seed));
    world.insert_resource(SimTelemetry::default());
    world.insert_resource(EventMetrics::default());
    world.insert_resource(SimFault::default());
    world.insert_resource(SimulationEndTime(config.run_duration));
    world.insert_resource(config);
    Ok(())
}

/// Schedules the SimulationStarted event at time 0.
/// Call this after [build_scenario] and before running events; a clock that
/// has already advanced rejects the start as scheduled in the past.
pub fn initialize_simulation(world: &mut World) -> Result<(), SimulationFault> {
    world
        .resource_mut::<SimulationClock>()
        .schedule_at(0.0, EventKind::SimulationStarted, None)
}
