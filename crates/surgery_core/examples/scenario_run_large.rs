//! Compare recovery capacities on a long run: OR blocking rises as beds are removed.
//!
//! Run with: cargo run -p surgery_core --example scenario_run_large

use surgery_core::{run_statistics, SimulationConfig};

fn main() {
    env_logger::init();

    println!("beds  patients  avg_throughput  blocking_prob  avg_prep_queue");
    for beds in 1..=5 {
        let config = SimulationConfig::default()
            .with_capacities(3, 1, beds)
            .with_run_duration(100_000.0, 5_000.0);
        match run_statistics(config) {
            Ok(stats) => println!(
                "{beds:>4}  {:>8}  {:>14.2}  {:>13.4}  {:>14.2}",
                stats.num_patients,
                stats.avg_throughput_time,
                stats.or_blocking_probability,
                stats.avg_prep_queue_length
            ),
            Err(err) => println!("{beds:>4}  {err}"),
        }
    }
}
