use bevy_ecs::prelude::{Entity, Query, Res, ResMut};
use log::debug;

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::distributions::SimRng;
use crate::ecs::{Patient, PatientStage, PatientTiming};
use crate::error::{SimError, SimulationFault};
use crate::pools::{Acquire, PoolKind, ResourcePools};
use crate::scenario::SimulationConfig;

use super::surgery::start_surgery;
use super::{expect_stage, subject_patient};

/// A new patient asks for a preparation bay.
pub fn prep_request_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut rng: ResMut<SimRng>,
    mut pools: ResMut<ResourcePools>,
    config: Res<SimulationConfig>,
    mut patients: Query<(&mut Patient, &mut PatientTiming)>,
) -> Result<(), SimError> {
    if event.0.kind != EventKind::PrepRequested {
        return Ok(());
    }
    let entity = subject_patient(&event.0)?;
    let Ok((mut patient, mut timing)) = patients.get_mut(entity) else {
        return Err(SimulationFault::UnknownPatient(entity).into());
    };
    expect_stage(entity, &patient, PatientStage::WaitingForPrep, event.0.kind)?;

    match pools.prep.acquire(entity, patient.class.priority())? {
        Acquire::Granted => start_prep(entity, &mut patient, &mut timing, &mut clock, &mut rng, &config),
        Acquire::Queued { position } => {
            debug!(
                "t={:.3} patient {} waits for a prep bay at position {position}",
                clock.now(),
                patient.id
            );
            Ok(())
        }
    }
}

/// A released prep bay was handed to a waiting patient.
pub fn prep_granted_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut rng: ResMut<SimRng>,
    pools: Res<ResourcePools>,
    config: Res<SimulationConfig>,
    mut patients: Query<(&mut Patient, &mut PatientTiming)>,
) -> Result<(), SimError> {
    if event.0.kind != EventKind::PrepGranted {
        return Ok(());
    }
    let entity = subject_patient(&event.0)?;
    if !pools.prep.holds(entity) {
        return Err(SimulationFault::GrantNotHeld {
            pool: PoolKind::PrepBay,
            patient: entity,
        }
        .into());
    }
    let Ok((mut patient, mut timing)) = patients.get_mut(entity) else {
        return Err(SimulationFault::UnknownPatient(entity).into());
    };
    expect_stage(entity, &patient, PatientStage::WaitingForPrep, event.0.kind)?;

    start_prep(entity, &mut patient, &mut timing, &mut clock, &mut rng, &config)
}

/// Preparation is done. The patient keeps the prep bay and asks for an operating room.
pub fn prep_finished_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut rng: ResMut<SimRng>,
    mut pools: ResMut<ResourcePools>,
    config: Res<SimulationConfig>,
    mut patients: Query<(&mut Patient, &mut PatientTiming)>,
) -> Result<(), SimError> {
    if event.0.kind != EventKind::PrepFinished {
        return Ok(());
    }
    let entity = subject_patient(&event.0)?;
    let Ok((mut patient, mut timing)) = patients.get_mut(entity) else {
        return Err(SimulationFault::UnknownPatient(entity).into());
    };
    expect_stage(entity, &patient, PatientStage::InPrep, event.0.kind)?;

    let now = clock.now();
    timing.prep_end = Some(now);
    patient.stage = PatientStage::WaitingForOperatingRoom;

    match pools.operating.acquire(entity, patient.class.priority())? {
        Acquire::Granted => start_surgery(
            entity,
            &mut patient,
            &mut timing,
            &mut pools,
            &mut clock,
            &mut rng,
            &config,
        ),
        Acquire::Queued { position } => {
            debug!(
                "t={now:.3} patient {} holds its prep bay, waiting for an operating room at position {position}",
                patient.id
            );
            Ok(())
        }
    }
}

/// Occupy the prep bay for one sampled preparation time.
pub(crate) fn start_prep(
    entity: Entity,
    patient: &mut Patient,
    timing: &mut PatientTiming,
    clock: &mut SimulationClock,
    rng: &mut SimRng,
    config: &SimulationConfig,
) -> Result<(), SimError> {
    let now = clock.now();
    timing.prep_start = Some(now);
    patient.stage = PatientStage::InPrep;

    let duration = rng.sample(&config.prep_time);
    clock.schedule_in(duration, EventKind::PrepFinished, Some(EventSubject::Patient(entity)))?;
    debug!("t={now:.3} patient {} starts prep for {duration:.3}", patient.id);
    Ok(())
}
