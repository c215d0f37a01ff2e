//! Patient generator: one arrival per interarrival draw, for as long as the run lasts.

use bevy_ecs::prelude::{Commands, Res, ResMut};
use log::debug;

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::distributions::SimRng;
use crate::ecs::{Patient, PatientClass, PatientStage, PatientTiming};
use crate::error::SimError;
use crate::pools::ResourcePools;
use crate::scenario::{QueueSampling, SimulationConfig};
use crate::telemetry::SimTelemetry;

/// Starts the generator and, in interval mode, the queue sampler.
pub fn simulation_started_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut rng: ResMut<SimRng>,
    config: Res<SimulationConfig>,
) -> Result<(), SimError> {
    if event.0.kind != EventKind::SimulationStarted {
        return Ok(());
    }

    let first_arrival = rng.sample(&config.interarrival);
    clock.schedule_in(first_arrival, EventKind::PatientArrival, None)?;

    if let QueueSampling::Interval(_) = config.queue_sampling {
        clock.schedule_now(EventKind::SampleQueue, None)?;
    }
    Ok(())
}

pub fn patient_arrival_system(
    mut commands: Commands,
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut rng: ResMut<SimRng>,
    mut telemetry: ResMut<SimTelemetry>,
    pools: Res<ResourcePools>,
    config: Res<SimulationConfig>,
) -> Result<(), SimError> {
    if event.0.kind != EventKind::PatientArrival {
        return Ok(());
    }

    let now = clock.now();
    telemetry.patients_arrived += 1;
    let id = telemetry.patients_arrived;

    let class = if config.emergency_probability > 0.0 && rng.chance(config.emergency_probability) {
        PatientClass::Emergency
    } else {
        PatientClass::Elective
    };

    let queue_len = pools.prep.queue_len();
    if config.queue_sampling == QueueSampling::OnArrival {
        telemetry.record_queue_sample(now, queue_len);
    }

    let entity = commands
        .spawn((
            Patient {
                id,
                class,
                stage: PatientStage::WaitingForPrep,
                prep_queue_on_arrival: queue_len,
            },
            PatientTiming::arrived_at(now),
        ))
        .id();
    debug!("t={now:.3} patient {id} ({class:?}) arrived, prep queue {queue_len}");

    clock.schedule_now(EventKind::PrepRequested, Some(EventSubject::Patient(entity)))?;

    let next_arrival = rng.sample(&config.interarrival);
    clock.schedule_in(next_arrival, EventKind::PatientArrival, None)?;
    Ok(())
}
