use bevy_ecs::prelude::{Entity, Query, Res, ResMut};
use log::debug;

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::distributions::SimRng;
use crate::ecs::{Patient, PatientStage, PatientTiming};
use crate::error::{SimError, SimulationFault};
use crate::pools::{Acquire, PoolKind, ResourcePools};
use crate::scenario::SimulationConfig;
use crate::telemetry::SimTelemetry;

use super::recovery::start_recovery;
use super::{expect_stage, subject_patient};

/// A freed operating room was handed to a patient waiting in its prep bay.
pub fn operating_room_granted_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut rng: ResMut<SimRng>,
    mut pools: ResMut<ResourcePools>,
    config: Res<SimulationConfig>,
    mut patients: Query<(&mut Patient, &mut PatientTiming)>,
) -> Result<(), SimError> {
    if event.0.kind != EventKind::OperatingRoomGranted {
        return Ok(());
    }
    let entity = subject_patient(&event.0)?;
    if !pools.operating.holds(entity) {
        return Err(SimulationFault::GrantNotHeld {
            pool: PoolKind::OperatingRoom,
            patient: entity,
        }
        .into());
    }
    let Ok((mut patient, mut timing)) = patients.get_mut(entity) else {
        return Err(SimulationFault::UnknownPatient(entity).into());
    };
    expect_stage(
        entity,
        &patient,
        PatientStage::WaitingForOperatingRoom,
        event.0.kind,
    )?;

    start_surgery(
        entity,
        &mut patient,
        &mut timing,
        &mut pools,
        &mut clock,
        &mut rng,
        &config,
    )
}

/// Surgery is done. Move to recovery if a bed is free, otherwise block the operating room.
pub fn surgery_finished_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut rng: ResMut<SimRng>,
    mut pools: ResMut<ResourcePools>,
    mut telemetry: ResMut<SimTelemetry>,
    config: Res<SimulationConfig>,
    mut patients: Query<(&mut Patient, &mut PatientTiming)>,
) -> Result<(), SimError> {
    if event.0.kind != EventKind::SurgeryFinished {
        return Ok(());
    }
    let entity = subject_patient(&event.0)?;
    let Ok((mut patient, mut timing)) = patients.get_mut(entity) else {
        return Err(SimulationFault::UnknownPatient(entity).into());
    };
    expect_stage(entity, &patient, PatientStage::InSurgery, event.0.kind)?;

    let now = clock.now();
    timing.surgery_end = Some(now);

    match pools.recovery.acquire(entity, patient.class.priority())? {
        Acquire::Granted => start_recovery(
            entity,
            &mut patient,
            &mut timing,
            &mut pools,
            &mut telemetry,
            &mut clock,
            &mut rng,
            &config,
        ),
        Acquire::Queued { position } => {
            patient.stage = PatientStage::Blocking;
            telemetry.open_blocking(entity, patient.id, now);
            debug!(
                "t={now:.3} patient {} blocks the operating room, recovery queue position {position}",
                patient.id
            );
            Ok(())
        }
    }
}

/// Take the operating room: the prep bay is released only now, then surgery
/// runs for one sampled duration.
pub(crate) fn start_surgery(
    entity: Entity,
    patient: &mut Patient,
    timing: &mut PatientTiming,
    pools: &mut ResourcePools,
    clock: &mut SimulationClock,
    rng: &mut SimRng,
    config: &SimulationConfig,
) -> Result<(), SimError> {
    if let Some(next) = pools.prep.release(entity)? {
        clock.schedule_now(EventKind::PrepGranted, Some(EventSubject::Patient(next)))?;
    }

    let now = clock.now();
    timing.surgery_start = Some(now);
    patient.stage = PatientStage::InSurgery;

    let duration = rng.sample(&config.surgery_time);
    clock.schedule_in(
        duration,
        EventKind::SurgeryFinished,
        Some(EventSubject::Patient(entity)),
    )?;
    debug!("t={now:.3} patient {} starts surgery for {duration:.3}", patient.id);
    Ok(())
}
