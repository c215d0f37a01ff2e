//! Event-reacting systems. One system per [EventKind]; each one continues the
//! patient named by the event subject and schedules that patient's next step.
//!
//! Systems return `Result`; the runner pipes every result into [record_fault],
//! and a recorded fault aborts the run after the current step.

pub mod arrivals;
pub mod preparation;
pub mod queue_sample;
pub mod recovery;
pub mod surgery;

use bevy_ecs::prelude::{Entity, In, ResMut, Resource};
use log::error;

use crate::clock::{Event, EventKind};
use crate::ecs::{Patient, PatientStage};
use crate::error::{SimError, SimulationFault};

/// First fault raised by a system during the current run.
#[derive(Debug, Default, Resource)]
pub struct SimFault(pub Option<SimError>);

impl SimFault {
    pub fn take(&mut self) -> Option<SimError> {
        self.0.take()
    }
}

/// Pipe target for every event system.
pub fn record_fault(In(result): In<Result<(), SimError>>, mut fault: ResMut<SimFault>) {
    if let Err(err) = result {
        error!("simulation fault, aborting run: {err}");
        if fault.0.is_none() {
            fault.0 = Some(err);
        }
    }
}

fn subject_patient(event: &Event) -> Result<Entity, SimulationFault> {
    event
        .patient()
        .ok_or(SimulationFault::MissingSubject { kind: event.kind })
}

fn expect_stage(
    entity: Entity,
    patient: &Patient,
    expected: PatientStage,
    kind: EventKind,
) -> Result<(), SimulationFault> {
    if patient.stage == expected {
        Ok(())
    } else {
        Err(SimulationFault::UnexpectedStage {
            patient: entity,
            kind,
            stage: patient.stage.name(),
        })
    }
}
