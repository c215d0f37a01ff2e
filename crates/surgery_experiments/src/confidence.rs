//! Student-t confidence intervals over replication outputs.

use serde::Serialize;
use surgery_core::statistics::{mean, sample_std_dev};

/// Two-sided 95% critical values for 1..=30 degrees of freedom.
const T_TABLE_95: [f64; 30] = [
    12.706, 4.303, 3.182, 2.776, 2.571, 2.447, 2.365, 2.306, 2.262, 2.228, 2.201, 2.179, 2.160,
    2.145, 2.131, 2.120, 2.110, 2.101, 2.093, 2.086, 2.080, 2.074, 2.069, 2.064, 2.060, 2.056,
    2.052, 2.048, 2.045, 2.042,
];

/// Two-sided 95% Student-t critical value for `df` degrees of freedom.
///
/// Exact up to 30; beyond that the value for the next tabulated row below
/// `df` is used, which errs on the wide side.
pub fn t_critical_95(df: usize) -> f64 {
    match df {
        0 => f64::INFINITY,
        1..=30 => T_TABLE_95[df - 1],
        31..=39 => 2.042,
        40..=59 => 2.021,
        60..=119 => 2.000,
        _ => 1.980,
    }
}

/// 95% confidence interval for the mean of independent samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub mean: f64,
    pub std_dev: f64,
    /// Half-width of the interval.
    pub margin: f64,
    pub lower: f64,
    pub upper: f64,
    pub n: usize,
}

impl ConfidenceInterval {
    /// `None` for fewer than two samples.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let n = samples.len();
        if n < 2 {
            return None;
        }
        let mean = mean(samples);
        let std_dev = sample_std_dev(samples);
        let margin = t_critical_95(n - 1) * std_dev / (n as f64).sqrt();
        Some(Self {
            mean,
            std_dev,
            margin,
            lower: mean - margin,
            upper: mean + margin,
            n,
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Half-width relative to the mean; infinite when the mean is 0.
    pub fn relative_precision(&self) -> f64 {
        if self.mean == 0.0 {
            return f64::INFINITY;
        }
        self.margin / self.mean.abs()
    }
}

/// Paired-t comparison of two scenarios run with common random numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairedComparison {
    /// Mean of `a[i] - b[i]`.
    pub mean_difference: f64,
    pub interval: ConfidenceInterval,
    pub t_statistic: f64,
    pub critical_value: f64,
    /// The interval on the difference excludes zero.
    pub significant: bool,
}

impl PairedComparison {
    /// `None` when the slices differ in length or hold fewer than two pairs.
    pub fn between(a: &[f64], b: &[f64]) -> Option<Self> {
        if a.len() != b.len() {
            return None;
        }
        let differences: Vec<f64> = a.iter().zip(b).map(|(x, y)| x - y).collect();
        let interval = ConfidenceInterval::from_samples(&differences)?;
        let std_error = interval.std_dev / (interval.n as f64).sqrt();
        let t_statistic = if std_error > 0.0 {
            interval.mean / std_error
        } else if interval.mean == 0.0 {
            0.0
        } else {
            interval.mean.signum() * f64::INFINITY
        };
        let critical_value = t_critical_95(interval.n - 1);
        Some(Self {
            mean_difference: interval.mean,
            interval,
            t_statistic,
            critical_value,
            significant: !interval.contains(0.0),
        })
    }
}
