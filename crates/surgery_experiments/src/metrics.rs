//! Metric extraction and cross-replication summaries.
//!
//! A [Metric] names one scalar of [SimStatistics]. Replications without
//! post-warmup data are skipped when collecting samples, and per-class metrics
//! are skipped for replications where that class never completed.

use serde::Serialize;
use surgery_core::SimStatistics;

use crate::confidence::{ConfidenceInterval, PairedComparison};
use crate::runner::ReplicationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    AvgThroughputTime,
    StdThroughputTime,
    OrBlockingProbability,
    AvgPrepQueueLength,
    MaxPrepQueueLength,
    NumPatients,
    EmergencyThroughputTime,
    ElectiveThroughputTime,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::AvgThroughputTime => "avg_throughput_time",
            Metric::StdThroughputTime => "std_throughput_time",
            Metric::OrBlockingProbability => "or_blocking_probability",
            Metric::AvgPrepQueueLength => "avg_prep_queue_length",
            Metric::MaxPrepQueueLength => "max_prep_queue_length",
            Metric::NumPatients => "num_patients",
            Metric::EmergencyThroughputTime => "emergency_throughput_time",
            Metric::ElectiveThroughputTime => "elective_throughput_time",
        }
    }

    pub fn extract(&self, stats: &SimStatistics) -> Option<f64> {
        match self {
            Metric::AvgThroughputTime => Some(stats.avg_throughput_time),
            Metric::StdThroughputTime => Some(stats.std_throughput_time),
            Metric::OrBlockingProbability => Some(stats.or_blocking_probability),
            Metric::AvgPrepQueueLength => Some(stats.avg_prep_queue_length),
            Metric::MaxPrepQueueLength => Some(stats.max_prep_queue_length as f64),
            Metric::NumPatients => Some(stats.num_patients as f64),
            Metric::EmergencyThroughputTime => {
                stats.emergency.as_ref().map(|c| c.avg_throughput_time)
            }
            Metric::ElectiveThroughputTime => {
                stats.elective.as_ref().map(|c| c.avg_throughput_time)
            }
        }
    }
}

/// Values of `metric` across the replications that have it, in replication order.
pub fn metric_samples(results: &[ReplicationResult], metric: Metric) -> Vec<f64> {
    results
        .iter()
        .filter_map(|r| r.statistics.as_ref())
        .filter_map(|stats| metric.extract(stats))
        .collect()
}

/// Headline confidence intervals for one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioAnalysis {
    pub replications: usize,
    /// Replications that produced post-warmup data.
    pub replications_with_data: usize,
    pub throughput_time: Option<ConfidenceInterval>,
    pub or_blocking_probability: Option<ConfidenceInterval>,
    pub prep_queue_length: Option<ConfidenceInterval>,
}

impl ScenarioAnalysis {
    pub fn from_replications(results: &[ReplicationResult]) -> Self {
        let interval =
            |metric| ConfidenceInterval::from_samples(&metric_samples(results, metric));
        Self {
            replications: results.len(),
            replications_with_data: results.iter().filter(|r| r.has_data()).count(),
            throughput_time: interval(Metric::AvgThroughputTime),
            or_blocking_probability: interval(Metric::OrBlockingProbability),
            prep_queue_length: interval(Metric::AvgPrepQueueLength),
        }
    }
}

/// Paired comparison of `metric` between two scenarios.
///
/// Replications are paired by index, so both batches should share a base
/// seed. Pairs where either side lacks the metric are dropped.
pub fn compare_scenarios(
    a: &[ReplicationResult],
    b: &[ReplicationResult],
    metric: Metric,
) -> Option<PairedComparison> {
    let (left, right): (Vec<f64>, Vec<f64>) = a
        .iter()
        .zip(b)
        .filter_map(|(ra, rb)| {
            let va = ra.statistics.as_ref().and_then(|s| metric.extract(s))?;
            let vb = rb.statistics.as_ref().and_then(|s| metric.extract(s))?;
            Some((va, vb))
        })
        .unzip();
    PairedComparison::between(&left, &right)
}
