use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::error::SimError;
use crate::pools::ResourcePools;
use crate::scenario::{QueueSampling, SimulationConfig};
use crate::telemetry::SimTelemetry;

/// Periodic monitor of the preparation waiting line.
pub fn queue_sample_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut telemetry: ResMut<SimTelemetry>,
    pools: Res<ResourcePools>,
    config: Res<SimulationConfig>,
) -> Result<(), SimError> {
    if event.0.kind != EventKind::SampleQueue {
        return Ok(());
    }
    let QueueSampling::Interval(interval) = config.queue_sampling else {
        return Ok(());
    };

    telemetry.record_queue_sample(clock.now(), pools.prep.queue_len());
    clock.schedule_in(interval, EventKind::SampleQueue, None)?;
    Ok(())
}
