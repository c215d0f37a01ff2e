mod support;

use surgery_core::clock::SimTime;
use surgery_core::error::{ConfigError, SimError};
use surgery_core::pools::{PoolKind, ResourcePools};
use surgery_core::statistics::{mean, sample_std_dev};
use surgery_core::test_helpers::{deterministic_config, fixed, reference_config};
use surgery_core::{run, QueueSampling, Simulation, SimulationConfig};
use support::init_logging;

fn timestamps_bits(config: SimulationConfig) -> Vec<[u64; 7]> {
    run(config)
        .expect("run")
        .iter()
        .map(|record| record.timestamps().map(f64::to_bits))
        .collect()
}

#[test]
fn clock_never_moves_backward() {
    init_logging();
    let mut simulation = Simulation::new(reference_config()).expect("config");
    let mut last: SimTime = 0.0;
    let mut steps = 0u64;
    simulation
        .run_with_hook(|_, event| {
            assert!(event.timestamp >= last, "{} after {}", event.timestamp, last);
            last = event.timestamp;
            steps += 1;
        })
        .expect("run");
    assert!(steps > 0);
    assert!(last <= 1000.0);
}

#[test]
fn pools_never_exceed_capacity() {
    init_logging();
    let config = reference_config().with_capacities(2, 1, 1);
    let mut simulation = Simulation::new(config).expect("config");
    let mut peak_queue = 0;
    simulation
        .run_with_hook(|world, _| {
            let pools = world.resource::<ResourcePools>();
            for pool in pools.iter() {
                assert!(pool.in_use() <= pool.capacity(), "{} over capacity", pool.kind());
            }
            peak_queue = peak_queue.max(pools.prep.queue_len());
        })
        .expect("run");

    let pools = simulation.pools();
    assert_eq!(pools.get(PoolKind::OperatingRoom).peak_in_use(), 1);
    assert!(pools.recovery.peak_in_use() <= 1);
    assert!(peak_queue > 0, "a single recovery bed should back up preparation");
}

#[test]
fn completed_patients_respect_stage_order() {
    init_logging();
    let records = run(reference_config().with_capacities(3, 1, 1)).expect("run");
    assert!(!records.is_empty());
    for record in &records {
        let ts = record.timestamps();
        assert!(ts.windows(2).all(|w| w[0] <= w[1]), "patient {} out of order: {ts:?}", record.id);
        assert!(record.prep_end <= record.surgery_start);
        assert!(record.blocked_time() >= 0.0);
    }
    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    let mut unique = ids.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn same_seed_reproduces_bit_identical_timestamps() {
    init_logging();
    let first = timestamps_bits(reference_config());
    let second = timestamps_bits(reference_config());
    assert!(!first.is_empty());
    assert_eq!(first, second);

    let other = timestamps_bits(reference_config().with_seed(43));
    assert_ne!(first, other);
}

#[test]
fn statistics_match_manual_warmup_filter() {
    init_logging();
    let config = reference_config();
    let mut simulation = Simulation::new(config.clone()).expect("config");
    simulation.run().expect("run");
    let stats = simulation.statistics().expect("stats");

    let kept: Vec<f64> = simulation
        .completed_patients()
        .iter()
        .filter(|p| p.recovery_end >= config.warmup)
        .map(|p| p.throughput_time())
        .collect();
    assert_eq!(stats.num_patients, kept.len());
    assert!((stats.avg_throughput_time - mean(&kept)).abs() < 1e-9);
    assert!((stats.std_throughput_time - sample_std_dev(&kept)).abs() < 1e-9);

    let samples: Vec<f64> = simulation
        .queue_samples()
        .iter()
        .filter(|s| s.timestamp >= config.warmup)
        .map(|s| s.length as f64)
        .collect();
    assert!((stats.avg_prep_queue_length - mean(&samples)).abs() < 1e-9);
}

#[test]
fn reference_scenario_is_deterministic() {
    init_logging();
    let first = surgery_core::run_statistics(reference_config()).expect("stats");
    let second = surgery_core::run_statistics(reference_config()).expect("stats");

    assert!(first.num_patients > 0);
    assert!(first.or_blocking_probability >= 0.0);
    assert!(first.or_blocking_probability <= 1.0);
    assert_eq!(first, second);
}

#[test]
fn fewer_recovery_beds_never_reduce_blocking() {
    init_logging();
    let three = surgery_core::run_statistics(reference_config()).expect("stats");
    let one = surgery_core::run_statistics(reference_config().with_capacities(3, 1, 1))
        .expect("stats");
    assert!(
        one.or_blocking_probability >= three.or_blocking_probability,
        "1 bed: {}, 3 beds: {}",
        one.or_blocking_probability,
        three.or_blocking_probability
    );
}

#[test]
fn arrival_sampling_records_one_sample_per_arrival() {
    init_logging();
    let config = reference_config().with_queue_sampling(QueueSampling::OnArrival);
    let mut simulation = Simulation::new(config).expect("config");
    let records = simulation.run().expect("run").to_vec();

    let samples = simulation.queue_samples();
    assert_eq!(samples.len() as u64, simulation.telemetry().patients_arrived);
    for record in records {
        let sample = samples[(record.id - 1) as usize];
        assert_eq!(sample.timestamp, record.arrival);
        assert_eq!(sample.length, record.prep_queue_on_arrival);
    }
}

#[test]
fn invalid_configurations_are_rejected() {
    let cases = [
        (
            deterministic_config().with_capacities(0, 1, 1),
            ConfigError::ZeroCapacity { pool: PoolKind::PrepBay },
        ),
        (
            deterministic_config().with_run_duration(0.0, 0.0),
            ConfigError::InvalidRunDuration(0.0),
        ),
        (
            deterministic_config().with_run_duration(100.0, 100.0),
            ConfigError::InvalidWarmup {
                warmup: 100.0,
                run_duration: 100.0,
            },
        ),
        (
            deterministic_config().with_emergency_priority(1.5),
            ConfigError::InvalidEmergencyProbability(1.5),
        ),
        (
            deterministic_config().with_queue_sampling(QueueSampling::Interval(0.0)),
            ConfigError::InvalidSamplingInterval(0.0),
        ),
    ];
    for (config, expected) in cases {
        match Simulation::new(config) {
            Err(SimError::Config(err)) => assert_eq!(err, expected),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("expected {expected}"),
        }
    }

    assert!(matches!(
        Simulation::new(deterministic_config().with_surgery_time(fixed(-1.0))),
        Err(SimError::Config(ConfigError::InvalidDistribution { name: "surgery", .. }))
    ));
}

#[test]
fn run_without_post_warmup_patients_reports_no_data() {
    init_logging();
    let config = deterministic_config()
        .with_interarrival(fixed(100.0))
        .with_run_duration(50.0, 10.0);
    let mut simulation = Simulation::new(config).expect("config");
    let completed = simulation.run().expect("run").len();

    assert_eq!(completed, 0);
    assert_eq!(
        simulation.statistics(),
        Err(SimError::NoData { warmup: 10.0 })
    );
}
