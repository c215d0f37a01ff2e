//! Run the reference scenario (capacities 3/1/3, seed 42) and print its statistics.
//!
//! Run with: cargo run -p surgery_core --example scenario_run

use surgery_core::{Simulation, SimulationConfig};

fn main() {
    env_logger::init();

    let config = SimulationConfig::default();
    let mut simulation = match Simulation::new(config) {
        Ok(simulation) => simulation,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    let completed = match simulation.run() {
        Ok(records) => records.len(),
        Err(err) => {
            eprintln!("run aborted: {err}");
            std::process::exit(1);
        }
    };

    println!("--- Reference scenario (3 prep / 1 OR / 3 recovery, seed 42) ---");
    println!("Events processed: {}", simulation.metrics().events_processed);
    println!("Simulation time: {:.1} min", simulation.now());
    println!("Patients arrived: {}", simulation.telemetry().patients_arrived);
    println!("Patients completed: {completed}");

    println!("\nFirst completed patients:");
    for record in simulation.completed_patients().iter().take(10) {
        println!(
            "  #{:<3} arrival={:>7.1}  prep_wait={:>6.1}  or_wait={:>6.1}  blocked={:>6.1}  throughput={:>6.1}",
            record.id,
            record.arrival,
            record.prep_wait(),
            record.operating_room_wait(),
            record.blocked_time(),
            record.throughput_time()
        );
    }

    match simulation.statistics() {
        Ok(stats) => println!("\n{stats}"),
        Err(err) => println!("\nno statistics: {err}"),
    }
}
