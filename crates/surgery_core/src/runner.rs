//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each step
//! pops the next event from [SimulationClock], inserts it as [CurrentEvent],
//! then runs the schedule. A fault recorded by any system ends the run with
//! that fault once the step completes.

use bevy_ecs::prelude::{IntoSystem, Res, Schedule, World};
use bevy_ecs::schedule::{apply_deferred, ExecutorKind, IntoSystemConfigs};

use crate::clock::{CurrentEvent, Event, EventKind, SimTime, SimulationClock};
use crate::error::SimError;
use crate::profiling::EventMetrics;
use crate::scenario::SimulationEndTime;
use crate::systems::{
    arrivals::{patient_arrival_system, simulation_started_system},
    preparation::{prep_finished_system, prep_granted_system, prep_request_system},
    queue_sample::queue_sample_system,
    record_fault,
    recovery::{recovery_finished_system, recovery_granted_system},
    surgery::{operating_room_granted_system, surgery_finished_system},
    SimFault,
};

/// Run condition: the current event is of `kind`.
fn on_event(kind: EventKind) -> impl FnMut(Option<Res<CurrentEvent>>) -> bool + Clone {
    move |event: Option<Res<CurrentEvent>>| event.map(|e| e.0.kind == kind).unwrap_or(false)
}

fn end_time(world: &World) -> SimTime {
    world
        .get_resource::<SimulationEndTime>()
        .map(|end| end.0)
        .unwrap_or(SimTime::INFINITY)
}

fn step<F>(
    world: &mut World,
    schedule: &mut Schedule,
    stop_at: SimTime,
    hook: &mut F,
) -> Result<bool, SimError>
where
    F: FnMut(&World, &Event),
{
    let next_ts = world
        .get_resource::<SimulationClock>()
        .and_then(|c| c.next_event_time());
    match next_ts {
        Some(ts) if ts <= stop_at => {}
        _ => return Ok(false),
    }

    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(e) => e,
        None => return Ok(false),
    };
    world.insert_resource(CurrentEvent(event));

    if let Some(mut metrics) = world.get_resource_mut::<EventMetrics>() {
        metrics.record_event(event.kind);
    }

    schedule.run(world);

    if let Some(fault) = world
        .get_resource_mut::<SimFault>()
        .and_then(|mut fault| fault.take())
    {
        return Err(fault);
    }
    hook(world, &event);
    Ok(true)
}

/// Runs one simulation step: pops the next event, inserts it as [CurrentEvent], then runs the schedule.
/// Returns `Ok(true)` if an event was processed, `Ok(false)` if the clock was empty or if the next
/// event lies after [SimulationEndTime] (when that resource is present).
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> Result<bool, SimError> {
    let stop_at = end_time(world);
    step(world, schedule, stop_at, &mut |_: &World, _: &Event| {})
}

/// Runs one simulation step and invokes `hook` after the schedule completes.
pub fn run_next_event_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    mut hook: F,
) -> Result<bool, SimError>
where
    F: FnMut(&World, &Event),
{
    let stop_at = end_time(world);
    step(world, schedule, stop_at, &mut hook)
}

/// Processes every event with timestamp <= `end` (and never past [SimulationEndTime]).
/// Returns the number of steps executed.
pub fn run_until(world: &mut World, schedule: &mut Schedule, end: SimTime) -> Result<u64, SimError> {
    let stop_at = end.min(end_time(world));
    let mut steps = 0;
    while step(world, schedule, stop_at, &mut |_: &World, _: &Event| {})? {
        steps += 1;
    }
    Ok(steps)
}

/// Runs until the queue holds nothing at or before [SimulationEndTime].
pub fn run_until_end(world: &mut World, schedule: &mut Schedule) -> Result<u64, SimError> {
    run_until_end_with_hook(world, schedule, |_, _| {})
}

/// Runs until the end of the run and invokes `hook` after each step.
pub fn run_until_end_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    mut hook: F,
) -> Result<u64, SimError>
where
    F: FnMut(&World, &Event),
{
    let mut steps = 0;
    while run_next_event_with_hook(world, schedule, &mut hook)? {
        steps += 1;
    }
    Ok(steps)
}

/// Builds the simulation schedule: one system per event kind, each gated on the
/// current event, plus [apply_deferred] so spawned patients exist before the next step.
///
/// The executor is single threaded and the systems are chained, so a run is a
/// pure function of its configuration and seed.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);

    schedule.add_systems(
        (
            simulation_started_system
                .pipe(record_fault)
                .run_if(on_event(EventKind::SimulationStarted)),
            patient_arrival_system
                .pipe(record_fault)
                .run_if(on_event(EventKind::PatientArrival)),
            prep_request_system
                .pipe(record_fault)
                .run_if(on_event(EventKind::PrepRequested)),
            prep_granted_system
                .pipe(record_fault)
                .run_if(on_event(EventKind::PrepGranted)),
            prep_finished_system
                .pipe(record_fault)
                .run_if(on_event(EventKind::PrepFinished)),
            operating_room_granted_system
                .pipe(record_fault)
                .run_if(on_event(EventKind::OperatingRoomGranted)),
            surgery_finished_system
                .pipe(record_fault)
                .run_if(on_event(EventKind::SurgeryFinished)),
            recovery_granted_system
                .pipe(record_fault)
                .run_if(on_event(EventKind::RecoveryGranted)),
            recovery_finished_system
                .pipe(record_fault)
                .run_if(on_event(EventKind::RecoveryFinished)),
            queue_sample_system
                .pipe(record_fault)
                .run_if(on_event(EventKind::SampleQueue)),
            apply_deferred,
        )
            .chain(),
    );

    schedule
}
