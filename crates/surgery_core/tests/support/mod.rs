#![allow(dead_code)]

pub mod schedule;
pub mod world;

use bevy_ecs::prelude::{Entity, World};
use surgery_core::ecs::{Patient, PatientTiming};

/// Route `log` output through the test harness. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Look up a patient by its arrival number.
pub fn patient_by_id(world: &mut World, id: u64) -> Option<(Entity, Patient, PatientTiming)> {
    let mut query = world.query::<(Entity, &Patient, &PatientTiming)>();
    query
        .iter(world)
        .find(|(_, patient, _)| patient.id == id)
        .map(|(entity, patient, timing)| (entity, *patient, *timing))
}
