mod support;

use surgery_core::ecs::PatientStage;
use surgery_core::pools::ResourcePools;
use surgery_core::statistics::compute_statistics;
use surgery_core::scenario::SimulationConfig;
use surgery_core::telemetry::SimTelemetry;
use support::schedule::ScheduleRunner;
use support::world::TestWorldBuilder;
use support::{init_logging, patient_by_id};

#[test]
fn uncontended_patient_walks_through_every_stage() {
    init_logging();
    let mut world = TestWorldBuilder::new()
        .with_capacities(1, 1, 1)
        .with_fixed_durations(100.0, 20.0, 15.0, 30.0)
        .with_run_duration(200.0, 0.0)
        .build();
    let mut runner = ScheduleRunner::new();
    runner.run_full(&mut world);

    let telemetry = world.resource::<SimTelemetry>();
    assert_eq!(telemetry.patients_arrived, 2);
    assert_eq!(telemetry.completed_patients.len(), 1);
    assert_eq!(
        telemetry.completed_patients[0].timestamps(),
        [100.0, 100.0, 120.0, 120.0, 135.0, 135.0, 165.0]
    );
    assert!(telemetry.blocking_intervals.is_empty());

    // The second patient arrived exactly at the end and got straight into prep.
    let (_, second, timing) = patient_by_id(&mut world, 2).expect("second patient");
    assert_eq!(second.stage, PatientStage::InPrep);
    assert_eq!(timing.prep_start, Some(200.0));
}

/// Arrivals every 10, prep 5, surgery 10, recovery 50, one recovery bed.
fn blocking_world() -> TestWorldBuilder {
    TestWorldBuilder::new()
        .with_capacities(3, 1, 1)
        .with_fixed_durations(10.0, 5.0, 10.0, 50.0)
        .with_run_duration(100.0, 0.0)
}

#[test]
fn finished_surgery_without_bed_blocks_the_operating_room() {
    init_logging();
    let mut world = blocking_world().build();
    let mut runner = ScheduleRunner::new();
    runner.run_until(&mut world, 35.0);

    let (second, patient, timing) = patient_by_id(&mut world, 2).expect("patient 2");
    assert_eq!(patient.stage, PatientStage::Blocking);
    assert_eq!(timing.surgery_end, Some(35.0));

    let (third, patient, timing) = patient_by_id(&mut world, 3).expect("patient 3");
    assert_eq!(patient.stage, PatientStage::WaitingForOperatingRoom);
    assert_eq!(timing.prep_end, Some(35.0));

    let pools = world.resource::<ResourcePools>();
    assert!(pools.operating.holds(second));
    assert!(pools.recovery.is_waiting(second));
    // Prep finished but no operating room yet: the bay stays occupied.
    assert!(pools.prep.holds(third));
    assert!(pools.operating.is_waiting(third));

    let telemetry = world.resource::<SimTelemetry>();
    assert_eq!(telemetry.open_blocking.len(), 1);
    assert_eq!(telemetry.open_blocking[0].start, 35.0);
}

#[test]
fn bed_release_unblocks_and_hands_operating_room_over() {
    init_logging();
    let mut world = blocking_world().build();
    let mut runner = ScheduleRunner::new();
    runner.run_until(&mut world, 75.0);

    let (_, first, _) = patient_by_id(&mut world, 1).expect("patient 1");
    assert_eq!(first.stage, PatientStage::Released);

    let (_, second, timing) = patient_by_id(&mut world, 2).expect("patient 2");
    assert_eq!(second.stage, PatientStage::InRecovery);
    assert_eq!(timing.recovery_start, Some(75.0));

    let (_, third, timing) = patient_by_id(&mut world, 3).expect("patient 3");
    assert_eq!(third.stage, PatientStage::InSurgery);
    assert_eq!(timing.surgery_start, Some(75.0));

    // Patient 6 found every bay taken at 60 and got the one patient 3 freed.
    let (sixth, patient, timing) = patient_by_id(&mut world, 6).expect("patient 6");
    assert_eq!(patient.stage, PatientStage::InPrep);
    assert_eq!(timing.arrival, 60.0);
    assert_eq!(timing.prep_start, Some(75.0));
    assert!(world.resource::<ResourcePools>().prep.holds(sixth));

    let telemetry = world.resource::<SimTelemetry>();
    assert!(telemetry.open_blocking.is_empty());
    assert_eq!(telemetry.blocking_intervals.len(), 1);
    assert_eq!(telemetry.blocking_intervals[0].start, 35.0);
    assert_eq!(telemetry.blocking_intervals[0].duration, 40.0);
}

#[test]
fn open_blocking_is_truncated_at_run_end() {
    init_logging();
    let builder = blocking_world();
    let config: SimulationConfig = builder.config().clone();
    let mut world = builder.build();
    let mut runner = ScheduleRunner::new();
    runner.run_full(&mut world);

    let telemetry = world.resource::<SimTelemetry>();
    assert_eq!(telemetry.completed_patients.len(), 1);
    assert_eq!(telemetry.open_blocking.len(), 1);
    assert_eq!(telemetry.open_blocking[0].start, 85.0);

    let stats = compute_statistics(telemetry, &config).expect("stats");
    assert_eq!(stats.num_patients, 1);
    assert_eq!(stats.avg_throughput_time, 65.0);
    assert_eq!(stats.num_blocking_events, 2);
    assert!((stats.total_or_blocking_time - 55.0).abs() < 1e-9);
    assert!((stats.or_blocking_probability - 0.55).abs() < 1e-9);
}
