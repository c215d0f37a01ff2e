use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use crate::clock::SimTime;
use crate::pools::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PatientClass {
    Emergency,
    #[default]
    Elective,
}

impl PatientClass {
    /// Queue priority under priority scheduling; lower is served first.
    pub fn priority(self) -> Priority {
        match self {
            PatientClass::Emergency => 0,
            PatientClass::Elective => 1,
        }
    }

    pub fn is_emergency(self) -> bool {
        self == PatientClass::Emergency
    }
}

/// Where a patient is in the prep → surgery → recovery pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatientStage {
    WaitingForPrep,
    InPrep,
    /// Preparation done; still occupying the prep bay until an operating room is free.
    WaitingForOperatingRoom,
    InSurgery,
    /// Surgery done but no recovery bed: the operating room is blocked.
    Blocking,
    InRecovery,
    Released,
}

impl PatientStage {
    pub fn name(self) -> &'static str {
        match self {
            PatientStage::WaitingForPrep => "waiting-for-prep",
            PatientStage::InPrep => "in-prep",
            PatientStage::WaitingForOperatingRoom => "waiting-for-operating-room",
            PatientStage::InSurgery => "in-surgery",
            PatientStage::Blocking => "blocking",
            PatientStage::InRecovery => "in-recovery",
            PatientStage::Released => "released",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Patient {
    /// Monotonic arrival number, starting at 1.
    pub id: u64,
    pub class: PatientClass,
    pub stage: PatientStage,
    /// Preparation waiting-line length seen when this patient arrived.
    pub prep_queue_on_arrival: usize,
}

/// Stage timestamps, filled in as the patient moves through the unit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Component)]
pub struct PatientTiming {
    pub arrival: SimTime,
    pub prep_start: Option<SimTime>,
    pub prep_end: Option<SimTime>,
    pub surgery_start: Option<SimTime>,
    pub surgery_end: Option<SimTime>,
    pub recovery_start: Option<SimTime>,
    pub recovery_end: Option<SimTime>,
}

impl PatientTiming {
    pub fn arrived_at(arrival: SimTime) -> Self {
        Self {
            arrival,
            ..Default::default()
        }
    }
}
