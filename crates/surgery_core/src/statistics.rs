//! Aggregate metrics over one run, after the warmup cutoff.
//!
//! Patients count when they left recovery at or after the warmup time. Queue
//! samples count when taken at or after it. Blocked time is clipped to the
//! observation window `[warmup, run_duration]`, with an interval still open at
//! the end of the run counted up to the end.

use std::fmt;

use serde::Serialize;

use crate::clock::SimTime;
use crate::ecs::PatientClass;
use crate::error::SimError;
use crate::scenario::SimulationConfig;
use crate::telemetry::{CompletedPatientRecord, SimTelemetry};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassStatistics {
    pub count: usize,
    pub avg_throughput_time: SimTime,
    pub std_throughput_time: SimTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimStatistics {
    pub num_patients: usize,
    pub avg_throughput_time: SimTime,
    pub std_throughput_time: SimTime,
    pub min_throughput_time: SimTime,
    pub max_throughput_time: SimTime,
    pub total_or_blocking_time: SimTime,
    /// Blocked time divided by the observation window.
    pub or_blocking_probability: f64,
    pub num_blocking_events: usize,
    pub avg_prep_queue_length: f64,
    pub max_prep_queue_length: usize,
    /// `None` when no emergency patient passed the warmup filter.
    pub emergency: Option<ClassStatistics>,
    pub elective: Option<ClassStatistics>,
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); 0 for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Completed patients that left recovery at or after `warmup`.
pub fn post_warmup_patients(
    patients: &[CompletedPatientRecord],
    warmup: SimTime,
) -> impl Iterator<Item = &CompletedPatientRecord> {
    patients.iter().filter(move |p| p.recovery_end >= warmup)
}

fn class_statistics(
    patients: &[&CompletedPatientRecord],
    class: PatientClass,
) -> Option<ClassStatistics> {
    let times: Vec<f64> = patients
        .iter()
        .filter(|p| p.class == class)
        .map(|p| p.throughput_time())
        .collect();
    if times.is_empty() {
        return None;
    }
    Some(ClassStatistics {
        count: times.len(),
        avg_throughput_time: mean(&times),
        std_throughput_time: sample_std_dev(&times),
    })
}

/// Derive run statistics. Returns [SimError::NoData] when no patient passes
/// the warmup filter.
pub fn compute_statistics(
    telemetry: &SimTelemetry,
    config: &SimulationConfig,
) -> Result<SimStatistics, SimError> {
    let warmup = config.warmup;
    let end = config.run_duration;

    let patients: Vec<&CompletedPatientRecord> =
        post_warmup_patients(&telemetry.completed_patients, warmup).collect();
    if patients.is_empty() {
        return Err(SimError::NoData { warmup });
    }

    let throughput: Vec<f64> = patients.iter().map(|p| p.throughput_time()).collect();
    let min_throughput_time = throughput.iter().copied().fold(f64::INFINITY, f64::min);
    let max_throughput_time = throughput.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut total_or_blocking_time = 0.0;
    let mut num_blocking_events = 0;
    for interval in telemetry.blocking_intervals_until(end) {
        if interval.start <= end && interval.end() >= warmup {
            num_blocking_events += 1;
            total_or_blocking_time += interval.overlap(warmup, end);
        }
    }
    let window = config.observation_window();
    let or_blocking_probability = if window > 0.0 {
        total_or_blocking_time / window
    } else {
        0.0
    };

    let queue_lengths: Vec<f64> = telemetry
        .queue_samples
        .iter()
        .filter(|s| s.timestamp >= warmup)
        .map(|s| s.length as f64)
        .collect();
    let max_prep_queue_length = telemetry
        .queue_samples
        .iter()
        .filter(|s| s.timestamp >= warmup)
        .map(|s| s.length)
        .max()
        .unwrap_or(0);

    Ok(SimStatistics {
        num_patients: patients.len(),
        avg_throughput_time: mean(&throughput),
        std_throughput_time: sample_std_dev(&throughput),
        min_throughput_time,
        max_throughput_time,
        total_or_blocking_time,
        or_blocking_probability,
        num_blocking_events,
        avg_prep_queue_length: mean(&queue_lengths),
        max_prep_queue_length,
        emergency: class_statistics(&patients, PatientClass::Emergency),
        elective: class_statistics(&patients, PatientClass::Elective),
    })
}

impl fmt::Display for SimStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "num_patients: {}", self.num_patients)?;
        writeln!(f, "avg_throughput_time: {:.2}", self.avg_throughput_time)?;
        writeln!(f, "std_throughput_time: {:.2}", self.std_throughput_time)?;
        writeln!(f, "min_throughput_time: {:.2}", self.min_throughput_time)?;
        writeln!(f, "max_throughput_time: {:.2}", self.max_throughput_time)?;
        writeln!(f, "total_or_blocking_time: {:.2}", self.total_or_blocking_time)?;
        writeln!(f, "or_blocking_probability: {:.4}", self.or_blocking_probability)?;
        writeln!(f, "num_blocking_events: {}", self.num_blocking_events)?;
        writeln!(f, "avg_prep_queue_length: {:.2}", self.avg_prep_queue_length)?;
        write!(f, "max_prep_queue_length: {}", self.max_prep_queue_length)?;
        for (label, class) in [("emergency", &self.emergency), ("elective", &self.elective)] {
            if let Some(class) = class {
                write!(
                    f,
                    "\n{label}: n={} avg={:.2} std={:.2}",
                    class.count, class.avg_throughput_time, class.std_throughput_time
                )?;
            }
        }
        Ok(())
    }
}
