//! Serial-correlation analysis of the prep queue-length series.
//!
//! Arrival-time queue samples are irregularly spaced, so they are first
//! averaged over fixed windows; the lag-k autocorrelation of the windowed
//! series is then averaged across replications.

use surgery_core::clock::SimTime;
use surgery_core::statistics::mean;
use surgery_core::telemetry::QueueSample;

/// Average the samples falling in each of `count` consecutive windows
/// `[start + i * window, start + (i + 1) * window)`. Empty windows read as 0.
pub fn windowed_series(
    samples: &[QueueSample],
    start: SimTime,
    window: SimTime,
    count: usize,
) -> Vec<f64> {
    let mut sums = vec![0.0; count];
    let mut counts = vec![0usize; count];
    if window > 0.0 {
        for sample in samples.iter().filter(|s| s.timestamp >= start) {
            let index = ((sample.timestamp - start) / window).floor() as usize;
            if index < count {
                sums[index] += sample.length as f64;
                counts[index] += 1;
            }
        }
    }
    sums.iter()
        .zip(&counts)
        .map(|(&sum, &n)| if n == 0 { 0.0 } else { sum / n as f64 })
        .collect()
}

/// Pearson correlation between `series[..len - lag]` and `series[lag..]`.
///
/// `None` when fewer than two pairs remain or either side is constant.
pub fn lag_correlation(series: &[f64], lag: usize) -> Option<f64> {
    if series.len() < lag + 2 {
        return None;
    }
    let x = &series[..series.len() - lag];
    let y = &series[lag..];
    let (mx, my) = (mean(x), mean(y));
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y) {
        cov += (a - mx) * (b - my);
        vx += (a - mx).powi(2);
        vy += (b - my).powi(2);
    }
    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some(cov / (vx * vy).sqrt())
}

/// Lag 1..=`max_lag` autocorrelations, each averaged over the series where it
/// is defined. A lag defined in no series reads as 0.
pub fn autocorrelation(series: &[Vec<f64>], max_lag: usize) -> Vec<f64> {
    (1..=max_lag)
        .map(|lag| {
            let values: Vec<f64> = series
                .iter()
                .filter_map(|s| lag_correlation(s, lag))
                .collect();
            mean(&values)
        })
        .collect()
}
