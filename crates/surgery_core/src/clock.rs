use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

use crate::error::SimulationFault;

/// Simulated time in minutes.
pub type SimTime = f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    SimulationStarted,
    PatientArrival,
    PrepRequested,
    PrepGranted,
    PrepFinished,
    OperatingRoomGranted,
    SurgeryFinished,
    RecoveryGranted,
    RecoveryFinished,
    SampleQueue,
}

/// The patient an event continues. Generator and sampler events carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSubject {
    Patient(Entity),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub timestamp: SimTime,
    /// Submission order; breaks ties between events at the same timestamp.
    pub seq: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
}

impl Event {
    pub fn patient(&self) -> Option<Entity> {
        match self.subject {
            Some(EventSubject::Patient(entity)) => Some(entity),
            None => None,
        }
    }
}

// Timestamps are validated finite on insertion, so total_cmp agrees with numeric order.
impl Eq for Event {}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (timestamp, seq).
        other
            .timestamp
            .total_cmp(&self.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event being processed in the current runner step.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: SimTime,
    next_seq: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Schedule `kind` at absolute time `timestamp`. Scheduling at `now` is the
    /// same-time retry idiom; anything earlier is a broken state machine.
    pub fn schedule_at(
        &mut self,
        timestamp: SimTime,
        kind: EventKind,
        subject: Option<EventSubject>,
    ) -> Result<(), SimulationFault> {
        if !timestamp.is_finite() {
            return Err(SimulationFault::NonFiniteTime {
                kind,
                at: timestamp,
            });
        }
        if timestamp < self.now {
            return Err(SimulationFault::ScheduledInPast {
                kind,
                at: timestamp,
                now: self.now,
            });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            timestamp,
            seq,
            kind,
            subject,
        });
        Ok(())
    }

    /// Schedule `kind` after `delay` minutes from now.
    pub fn schedule_in(
        &mut self,
        delay: SimTime,
        kind: EventKind,
        subject: Option<EventSubject>,
    ) -> Result<(), SimulationFault> {
        self.schedule_at(self.now + delay, kind, subject)
    }

    /// Schedule `kind` for the current instant, after everything already queued for it.
    pub fn schedule_now(
        &mut self,
        kind: EventKind,
        subject: Option<EventSubject>,
    ) -> Result<(), SimulationFault> {
        self.schedule_at(self.now, kind, subject)
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        debug_assert!(event.timestamp >= self.now, "clock must never move backward");
        self.now = event.timestamp;
        Some(event)
    }

    pub fn next_event_time(&self) -> Option<SimTime> {
        self.events.peek().map(|event| event.timestamp)
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pops_events_in_time_order() {
        let mut clock = SimulationClock::default();
        clock
            .schedule_at(10.0, EventKind::PatientArrival, None)
            .expect("schedule");
        clock
            .schedule_at(5.0, EventKind::PatientArrival, None)
            .expect("schedule");
        clock
            .schedule_at(20.0, EventKind::SampleQueue, None)
            .expect("schedule");

        let first = clock.pop_next().expect("first event");
        assert_eq!(first.timestamp, 5.0);
        assert_eq!(clock.now(), 5.0);

        let second = clock.pop_next().expect("second event");
        assert_eq!(second.timestamp, 10.0);
        assert_eq!(clock.now(), 10.0);

        let third = clock.pop_next().expect("third event");
        assert_eq!(third.timestamp, 20.0);
        assert_eq!(clock.now(), 20.0);

        assert!(clock.pop_next().is_none());
        assert!(clock.is_empty());
    }

    #[test]
    fn same_timestamp_events_pop_in_submission_order() {
        let mut clock = SimulationClock::default();
        clock
            .schedule_at(3.0, EventKind::SampleQueue, None)
            .expect("schedule");
        clock
            .schedule_at(3.0, EventKind::PatientArrival, None)
            .expect("schedule");
        clock
            .schedule_at(3.0, EventKind::PrepRequested, None)
            .expect("schedule");

        let kinds: Vec<_> = std::iter::from_fn(|| clock.pop_next())
            .map(|event| event.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::SampleQueue,
                EventKind::PatientArrival,
                EventKind::PrepRequested
            ]
        );
    }

    #[test]
    fn scheduling_in_the_past_is_a_fault() {
        let mut clock = SimulationClock::default();
        clock
            .schedule_at(7.5, EventKind::PatientArrival, None)
            .expect("schedule");
        clock.pop_next().expect("event");

        let err = clock
            .schedule_at(7.0, EventKind::PrepRequested, None)
            .expect_err("past timestamp must be rejected");
        assert!(matches!(
            err,
            SimulationFault::ScheduledInPast { at, now, .. } if at == 7.0 && now == 7.5
        ));
        assert!(clock.schedule_now(EventKind::PrepRequested, None).is_ok());
    }

    #[test]
    fn non_finite_times_are_rejected() {
        let mut clock = SimulationClock::default();
        assert!(matches!(
            clock.schedule_in(f64::NAN, EventKind::SampleQueue, None),
            Err(SimulationFault::NonFiniteTime { .. })
        ));
        assert!(matches!(
            clock.schedule_at(f64::INFINITY, EventKind::SampleQueue, None),
            Err(SimulationFault::NonFiniteTime { .. })
        ));
        assert!(clock.is_empty());
    }
}
