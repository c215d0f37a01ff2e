//! Example: 2^(6-3) fractional factorial experiment.
//!
//! This example demonstrates how to:
//! 1. Build the eight design points from a base configuration
//! 2. Replicate every point in parallel
//! 3. Estimate main effects on throughput time and OR blocking
//! 4. Compare two scenarios with a paired-t test
//!
//! Run with `RUST_LOG=info` to see per-run log lines.

use surgery_experiments::design::default_base;
use surgery_experiments::{
    autocorrelation, compare_scenarios, main_effects, run_design, run_replications,
    windowed_series, FactorialDesign, Metric, ScenarioAnalysis,
};

const REPLICATIONS: usize = 10;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let base = default_base();
    let design = FactorialDesign::fractional_2_6_3();

    println!("=== Design matrix ===");
    for point in &design.points {
        let signs: Vec<String> = point
            .levels
            .iter()
            .map(|level| format!("{:+}", level.sign()))
            .collect();
        println!("run {}: {}", point.run, signs.join(" "));
    }

    println!("\nRunning {} points x {} replications...", design.len(), REPLICATIONS);
    let results = run_design(&design, &base, REPLICATIONS, None)?;

    for metric in [Metric::AvgThroughputTime, Metric::OrBlockingProbability] {
        println!("\n=== Main effects on {} ===", metric.name());
        for (factor, effect) in main_effects(&results, metric) {
            println!("{} ({:<14}) {:+.4}", factor.letter(), factor.name(), effect);
        }
    }

    println!("\n=== Reference scenario, 3 vs 4 recovery beds ===");
    let three_beds = run_replications(&base, REPLICATIONS, None)?;
    let four_beds = run_replications(
        &base.clone().with_capacities(base.prep_bays, base.operating_rooms, 4),
        REPLICATIONS,
        None,
    )?;
    let analysis = ScenarioAnalysis::from_replications(&three_beds);
    if let Some(ci) = analysis.throughput_time {
        println!(
            "throughput time: {:.2} +/- {:.2} (n={})",
            ci.mean, ci.margin, ci.n
        );
    }
    if let Some(cmp) = compare_scenarios(&three_beds, &four_beds, Metric::OrBlockingProbability) {
        println!(
            "blocking difference: {:.4} [{:.4}, {:.4}] significant={}",
            cmp.mean_difference, cmp.interval.lower, cmp.interval.upper, cmp.significant
        );
    }

    let series: Vec<Vec<f64>> = three_beds
        .iter()
        .map(|r| windowed_series(&r.queue_samples, base.warmup, 100.0, 40))
        .collect();
    println!("\n=== Prep queue autocorrelation ===");
    for (lag, r) in autocorrelation(&series, 5).iter().enumerate() {
        println!("lag {}: {:.3}", lag + 1, r);
    }

    Ok(())
}
