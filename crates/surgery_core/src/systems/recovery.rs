use bevy_ecs::prelude::{Entity, Query, Res, ResMut};
use log::debug;

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::distributions::SimRng;
use crate::ecs::{Patient, PatientStage, PatientTiming};
use crate::error::{SimError, SimulationFault};
use crate::pools::{PoolKind, ResourcePools};
use crate::scenario::SimulationConfig;
use crate::telemetry::{CompletedPatientRecord, SimTelemetry};

use super::{expect_stage, subject_patient};

/// A freed recovery bed was handed to a patient blocking an operating room.
pub fn recovery_granted_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut rng: ResMut<SimRng>,
    mut pools: ResMut<ResourcePools>,
    mut telemetry: ResMut<SimTelemetry>,
    config: Res<SimulationConfig>,
    mut patients: Query<(&mut Patient, &mut PatientTiming)>,
) -> Result<(), SimError> {
    if event.0.kind != EventKind::RecoveryGranted {
        return Ok(());
    }
    let entity = subject_patient(&event.0)?;
    if !pools.recovery.holds(entity) {
        return Err(SimulationFault::GrantNotHeld {
            pool: PoolKind::RecoveryBed,
            patient: entity,
        }
        .into());
    }
    let Ok((mut patient, mut timing)) = patients.get_mut(entity) else {
        return Err(SimulationFault::UnknownPatient(entity).into());
    };
    expect_stage(entity, &patient, PatientStage::Blocking, event.0.kind)?;

    start_recovery(
        entity,
        &mut patient,
        &mut timing,
        &mut pools,
        &mut telemetry,
        &mut clock,
        &mut rng,
        &config,
    )
}

/// Recovery is done: free the bed and record the patient.
pub fn recovery_finished_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut pools: ResMut<ResourcePools>,
    mut telemetry: ResMut<SimTelemetry>,
    mut patients: Query<(&mut Patient, &mut PatientTiming)>,
) -> Result<(), SimError> {
    if event.0.kind != EventKind::RecoveryFinished {
        return Ok(());
    }
    let entity = subject_patient(&event.0)?;
    let Ok((mut patient, mut timing)) = patients.get_mut(entity) else {
        return Err(SimulationFault::UnknownPatient(entity).into());
    };
    expect_stage(entity, &patient, PatientStage::InRecovery, event.0.kind)?;

    let now = clock.now();
    if let Some(next) = pools.recovery.release(entity)? {
        clock.schedule_now(EventKind::RecoveryGranted, Some(EventSubject::Patient(next)))?;
    }

    timing.recovery_end = Some(now);
    patient.stage = PatientStage::Released;
    let record = completed_record(entity, &patient, &timing)
        .ok_or(SimulationFault::IncompleteTiming(entity))?;
    debug!(
        "t={now:.3} patient {} released after {:.3}",
        patient.id,
        record.throughput_time()
    );
    telemetry.completed_patients.push(record);
    Ok(())
}

/// Take the recovery bed: close any blocking interval, free the operating
/// room, then recover for one sampled duration.
#[allow(clippy::too_many_arguments)]
pub(crate) fn start_recovery(
    entity: Entity,
    patient: &mut Patient,
    timing: &mut PatientTiming,
    pools: &mut ResourcePools,
    telemetry: &mut SimTelemetry,
    clock: &mut SimulationClock,
    rng: &mut SimRng,
    config: &SimulationConfig,
) -> Result<(), SimError> {
    let now = clock.now();
    if let Some(interval) = telemetry.close_blocking(entity, now) {
        debug!(
            "t={now:.3} operating room unblocked by patient {} after {:.3}",
            patient.id, interval.duration
        );
    }

    if let Some(next) = pools.operating.release(entity)? {
        clock.schedule_now(
            EventKind::OperatingRoomGranted,
            Some(EventSubject::Patient(next)),
        )?;
    }

    timing.recovery_start = Some(now);
    patient.stage = PatientStage::InRecovery;

    let duration = rng.sample(&config.recovery_time);
    clock.schedule_in(
        duration,
        EventKind::RecoveryFinished,
        Some(EventSubject::Patient(entity)),
    )?;
    debug!("t={now:.3} patient {} starts recovery for {duration:.3}", patient.id);
    Ok(())
}

fn completed_record(
    entity: Entity,
    patient: &Patient,
    timing: &PatientTiming,
) -> Option<CompletedPatientRecord> {
    Some(CompletedPatientRecord {
        entity,
        id: patient.id,
        class: patient.class,
        prep_queue_on_arrival: patient.prep_queue_on_arrival,
        arrival: timing.arrival,
        prep_start: timing.prep_start?,
        prep_end: timing.prep_end?,
        surgery_start: timing.surgery_start?,
        surgery_end: timing.surgery_end?,
        recovery_start: timing.recovery_start?,
        recovery_end: timing.recovery_end?,
    })
}
