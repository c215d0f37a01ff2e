//! Telemetry: completed patients, OR blocking intervals and queue-length samples.
//!
//! Everything is recorded for the whole run; the warmup cutoff is applied only
//! when statistics are derived, so the raw series stay available for analysis.

use bevy_ecs::prelude::{Entity, Resource};
use serde::Serialize;

use crate::clock::SimTime;
use crate::ecs::PatientClass;

/// One patient that left recovery. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedPatientRecord {
    #[serde(skip)]
    pub entity: Entity,
    pub id: u64,
    pub class: PatientClass,
    pub prep_queue_on_arrival: usize,
    pub arrival: SimTime,
    pub prep_start: SimTime,
    pub prep_end: SimTime,
    pub surgery_start: SimTime,
    pub surgery_end: SimTime,
    pub recovery_start: SimTime,
    pub recovery_end: SimTime,
}

impl CompletedPatientRecord {
    /// Time from arrival to leaving recovery.
    pub fn throughput_time(&self) -> SimTime {
        self.recovery_end - self.arrival
    }

    /// Time spent waiting for a preparation bay.
    pub fn prep_wait(&self) -> SimTime {
        self.prep_start - self.arrival
    }

    /// Time spent in the prep bay after preparation finished, waiting for an operating room.
    pub fn operating_room_wait(&self) -> SimTime {
        self.surgery_start - self.prep_end
    }

    /// Time spent in the operating room after surgery finished, waiting for a recovery bed.
    pub fn blocked_time(&self) -> SimTime {
        self.recovery_start - self.surgery_end
    }

    /// The seven timestamps in lifecycle order.
    pub fn timestamps(&self) -> [SimTime; 7] {
        [
            self.arrival,
            self.prep_start,
            self.prep_end,
            self.surgery_start,
            self.surgery_end,
            self.recovery_start,
            self.recovery_end,
        ]
    }
}

/// A span during which an operating room held a patient whose surgery was done.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlockingInterval {
    pub start: SimTime,
    pub duration: SimTime,
    pub patient_id: u64,
}

impl BlockingInterval {
    pub fn end(&self) -> SimTime {
        self.start + self.duration
    }

    /// Portion of the interval inside `[from, to]`.
    pub fn overlap(&self, from: SimTime, to: SimTime) -> SimTime {
        (self.end().min(to) - self.start.max(from)).max(0.0)
    }
}

/// A blocking interval that has not closed yet, keyed by the blocked patient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenBlocking {
    pub patient: Entity,
    pub patient_id: u64,
    pub start: SimTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueueSample {
    pub timestamp: SimTime,
    pub length: usize,
}

/// Collects simulation telemetry for one run.
#[derive(Debug, Default, Resource)]
pub struct SimTelemetry {
    pub patients_arrived: u64,
    pub completed_patients: Vec<CompletedPatientRecord>,
    pub blocking_intervals: Vec<BlockingInterval>,
    /// One entry per currently blocked operating room.
    pub open_blocking: Vec<OpenBlocking>,
    pub queue_samples: Vec<QueueSample>,
}

impl SimTelemetry {
    pub fn open_blocking(&mut self, patient: Entity, patient_id: u64, start: SimTime) {
        debug_assert!(
            self.open_blocking.iter().all(|b| b.patient != patient),
            "a patient can block at most one operating room"
        );
        self.open_blocking.push(OpenBlocking {
            patient,
            patient_id,
            start,
        });
    }

    /// Close the blocking interval held by `patient`, if any.
    pub fn close_blocking(&mut self, patient: Entity, now: SimTime) -> Option<BlockingInterval> {
        let index = self.open_blocking.iter().position(|b| b.patient == patient)?;
        let open = self.open_blocking.swap_remove(index);
        let interval = BlockingInterval {
            start: open.start,
            duration: now - open.start,
            patient_id: open.patient_id,
        };
        self.blocking_intervals.push(interval);
        Some(interval)
    }

    pub fn record_queue_sample(&mut self, timestamp: SimTime, length: usize) {
        self.queue_samples.push(QueueSample { timestamp, length });
    }

    /// Closed intervals plus still-open ones truncated at `end`.
    pub fn blocking_intervals_until(&self, end: SimTime) -> Vec<BlockingInterval> {
        self.blocking_intervals
            .iter()
            .copied()
            .chain(self.open_blocking.iter().map(|open| BlockingInterval {
                start: open.start,
                duration: (end - open.start).max(0.0),
                patient_id: open.patient_id,
            }))
            .collect()
    }
}
