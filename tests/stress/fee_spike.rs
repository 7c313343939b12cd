//! Stress Test: Fee Spike
//!
//! Simulates a sudden demand spike (e.g., NFT mint, token launch) to verify
//! the fee market adjusts correctly: rising under load and recovering
//! gracefully afterward.
//!
//! Run: `cargo test --test fee_spike -- --nocapture`

use {
    blockspace_fee_market::{
        scenario::{run_scenario, DemandPhase, ScenarioOutcome},
        simulation::{create_initial_state, process_block},
        stats::calculate_stats,
        ConstantSample, FeeMarketConfig, RngSampleSource, SimulationOptions,
    },
    std::time::Instant,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn spike_phases() -> Vec<DemandPhase> {
    vec![
        DemandPhase::new("Quiet", 100, 0.3),
        DemandPhase::new("Ramp-up", 20, 0.6),
        DemandPhase::new("Spike (NFT mint)", 50, 1.0),
        DemandPhase::new("Sustained high", 100, 0.9),
        DemandPhase::new("Cool-down", 30, 0.5),
        DemandPhase::new("Recovery", 200, 0.3),
    ]
}

fn print_phases(outcome: &ScenarioOutcome) {
    for phase in &outcome.phases {
        println!(
            "Phase: {} (blocks {}..{}, avg util {:.3})",
            phase.name,
            phase.first_block,
            phase.first_block + phase.blocks,
            phase.average_utilization
        );
        println!(
            "  base_fee: {:.4} → {:.4} ({}), peak {:.4}",
            phase.start_fee,
            phase.end_fee,
            if phase.end_fee > phase.start_fee { "↑" } else { "↓" },
            phase.peak_fee
        );
    }
}

#[test]
fn stress_fee_spike_and_recovery() {
    init_logger();
    println!("\n=== Fee Spike Stress Test ===\n");

    let config = FeeMarketConfig::default();
    let phases = spike_phases();
    let start = Instant::now();
    let outcome = run_scenario(
        &config,
        &phases,
        &SimulationOptions::default(),
        &mut ConstantSample::default(),
    )
    .unwrap();
    let elapsed = start.elapsed();
    print_phases(&outcome);

    let pre_spike_fee = outcome.phases[0].end_fee;
    let peak_fee = outcome
        .phases
        .iter()
        .map(|phase| phase.peak_fee)
        .fold(0.0, f64::max);
    let final_fee = outcome.state.current_base_fee();
    let stats = calculate_stats(&outcome.state);

    println!("\n--- Results ---");
    println!("Total blocks simulated: {}", outcome.state.block_number());
    println!("Pre-spike base fee:     {pre_spike_fee:.4}");
    println!("Peak base fee:          {peak_fee:.4}");
    println!("Final base fee:         {final_fee:.4}");
    println!("Peak / Pre-spike ratio: {:.1}x", peak_fee / pre_spike_fee);
    println!("Fee volatility:         {:.4}", stats.fee_volatility);
    println!("Elapsed:                {elapsed:?}");

    assert_eq!(outcome.state.block_number(), 500);
    assert_eq!(outcome.phases.len(), phases.len());
    for pair in outcome.phases.windows(2) {
        assert_eq!(pair[1].first_block, pair[0].first_block + pair[0].blocks);
        assert_eq!(pair[1].start_fee, pair[0].end_fee);
    }

    // Elastic demand settles where realized demand meets the target:
    // fee = baseline × demand / target, i.e. 12 for the quiet phase.
    assert!((pre_spike_fee - 12.0).abs() < 0.01, "pre-spike fee {pre_spike_fee}");
    assert!(
        peak_fee > pre_spike_fee * 2.0,
        "fee should at least double during spike: peak={peak_fee}, pre_spike={pre_spike_fee}"
    );
    assert!(
        final_fee < peak_fee,
        "fee should recover below peak: final={final_fee}, peak={peak_fee}"
    );
    assert!(
        (final_fee - pre_spike_fee).abs() < pre_spike_fee * 0.01,
        "fee should return to the pre-spike level: final={final_fee}, pre_spike={pre_spike_fee}"
    );
    assert!(stats.min_base_fee >= config.min_base_fee);
}

#[test]
fn stress_noisy_spike_is_reproducible() {
    init_logger();
    println!("\n=== Noisy Fee Spike Reproducibility Test ===\n");

    let config = FeeMarketConfig::default();
    let phases = spike_phases();
    let options = SimulationOptions::with_noise(0.1);

    let run = |seed| {
        run_scenario(&config, &phases, &options, &mut RngSampleSource::seeded(seed)).unwrap()
    };
    let first = run(42);
    let second = run(42);
    print_phases(&first);

    assert_eq!(
        first.state.history_bytes().unwrap(),
        second.state.history_bytes().unwrap(),
        "same seed must replay the same history"
    );

    let pre_spike_fee = first.phases[0].end_fee;
    let spike_peak = first.phases[2].peak_fee;
    println!("\nPre-spike {pre_spike_fee:.4}, spike peak {spike_peak:.4}");
    assert!(spike_peak > pre_spike_fee * 1.5);
    assert!(first
        .state
        .blocks()
        .iter()
        .all(|block| (0.0..=1.0).contains(&block.utilization)));
}

#[test]
fn stress_fee_oscillation_stability() {
    init_logger();
    println!("\n=== Fee Oscillation Stability Test ===\n");

    let config = FeeMarketConfig::default();
    let mut state = create_initial_state(&config).unwrap();

    // Alternate between full and empty blocks for 1000 blocks
    let mut fees = Vec::with_capacity(1000);
    for i in 0..1000u64 {
        let utilization = if i % 2 == 0 { 1.0 } else { 0.0 };
        state = process_block(&state, utilization);
        fees.push(state.current_base_fee());
    }

    // A full/empty pair multiplies the fee by 1.125 × 0.875 < 1, so the
    // oscillation decays onto the floor and stays within one step of it.
    let last_100 = &fees[900..];
    let max_fee = last_100.iter().copied().fold(f64::MIN, f64::max);
    let min_fee = last_100.iter().copied().fold(f64::MAX, f64::min);
    let ratio = max_fee / min_fee;

    println!("After 1000 oscillating blocks:");
    println!("  Min fee (last 100): {min_fee:.4}");
    println!("  Max fee (last 100): {max_fee:.4}");
    println!("  Oscillation ratio:  {ratio:.4}x");

    assert_eq!(min_fee, config.min_base_fee);
    assert!(ratio <= 1.0 + config.max_change_rate + 1e-12, "ratio={ratio:.4}x");
}

#[test]
fn stress_sustained_congestion_and_floor_recovery() {
    init_logger();
    println!("\n=== Sustained Congestion Test ===\n");

    let config = FeeMarketConfig::default();
    let mut state = create_initial_state(&config).unwrap();

    // There is no ceiling: 1000 full blocks compound to 20 × 1.125^1000.
    for _ in 0..1000 {
        state = state.advance(1.0);
    }
    let congested_fee = state.current_base_fee();
    println!("After 1,000 full blocks: base_fee = {congested_fee:e}");
    assert!(congested_fee.is_finite());
    assert!(congested_fee > 1e50);

    let mut blocks_to_floor = 0u64;
    while state.current_base_fee() > config.min_base_fee {
        state = state.advance(0.0);
        blocks_to_floor += 1;
        if blocks_to_floor > 10_000 {
            break;
        }
    }

    println!("Blocks to recover to floor: {blocks_to_floor}");
    assert!(
        blocks_to_floor < 1_000,
        "recovery should complete within reasonable time"
    );
    assert_eq!(state.current_base_fee(), config.min_base_fee);
}
