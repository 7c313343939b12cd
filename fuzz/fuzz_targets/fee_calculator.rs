//! Fuzz the base fee controller with random and extreme inputs.
//!
//! Goals:
//! - Find panics in the fee update, demand response and noise model.
//! - Verify that the next base fee never drops below `min_base_fee`.
//! - Verify that utilizations stay in [0, 1] whatever the inputs.
//! - Verify monotonicity: higher utilization → higher or equal next base fee.

#![no_main]

use {
    arbitrary::{Arbitrary, Unstructured},
    blockspace_fee_market::{
        calculator::{calculate_demand_response, calculate_new_base_fee, generate_utilization},
        simulation::{continue_simulation, create_initial_state},
        ConstantSample, FeeMarketConfig, SimulationOptions,
    },
    libfuzzer_sys::fuzz_target,
};

/// Fuzz input: random fee market parameters and block inputs.
#[derive(Debug)]
struct FuzzInput {
    // Config
    target_utilization: f64,
    max_change_rate: f64,
    min_base_fee: f64,
    initial_base_fee: f64,
    baseline_fee: f64,

    // Block
    current_fee: f64,
    utilization: f64,
    other_utilization: f64,
    demand_level: f64,
    noise_level: f64,
    sample: f64,

    // Multi-block sequence
    seeds: Vec<f64>,
}

impl<'a> Arbitrary<'a> for FuzzInput {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let sequence_len = u.int_in_range(0..=64)?;
        Ok(FuzzInput {
            target_utilization: u.arbitrary()?,
            max_change_rate: u.arbitrary()?,
            min_base_fee: u.arbitrary()?,
            initial_base_fee: u.arbitrary()?,
            baseline_fee: u.arbitrary()?,
            current_fee: u.arbitrary()?,
            utilization: u.arbitrary()?,
            other_utilization: u.arbitrary()?,
            demand_level: u.arbitrary()?,
            noise_level: u.arbitrary()?,
            sample: u.arbitrary()?,
            seeds: (0..sequence_len)
                .map(|_| u.arbitrary())
                .collect::<arbitrary::Result<_>>()?,
        })
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let input: FuzzInput = match u.arbitrary() {
        Ok(i) => i,
        Err(_) => return,
    };

    let config = FeeMarketConfig {
        target_utilization: input.target_utilization,
        max_change_rate: input.max_change_rate,
        min_base_fee: input.min_base_fee,
        initial_base_fee: input.initial_base_fee,
        baseline_fee: input.baseline_fee,
    };

    // ── Test 1: the unit-interval helpers must not panic ──

    let realized = calculate_demand_response(input.demand_level, input.current_fee, input.baseline_fee);
    assert!((0.0..=1.0).contains(&realized), "realized demand {realized}");

    let utilization = generate_utilization(realized, input.noise_level, input.sample);
    assert!((0.0..=1.0).contains(&utilization), "utilization {utilization}");

    // ── Test 2: validate must not panic, and everything below needs it ──
    if config.validate().is_err() {
        return;
    }

    // ── Invariant: the floor holds for any finite current fee ──
    if input.current_fee.is_finite() {
        let next = calculate_new_base_fee(input.current_fee, input.utilization, &config);
        assert!(
            next >= config.min_base_fee,
            "next fee ({next}) < min_base_fee ({})",
            config.min_base_fee
        );

        // ── Test 3: monotonicity in utilization ──
        let (low, high) = if input.utilization <= input.other_utilization {
            (input.utilization, input.other_utilization)
        } else {
            (input.other_utilization, input.utilization)
        };
        if input.current_fee > 0.0 && low.is_finite() && high.is_finite() {
            let fee_low = calculate_new_base_fee(input.current_fee, low, &config);
            let fee_high = calculate_new_base_fee(input.current_fee, high, &config);
            assert!(
                fee_high >= fee_low,
                "Monotonicity violation: utilization {low} → fee {fee_low}, utilization {high} → fee {fee_high}"
            );
        }
    }

    // ── Test 4: multi-block sequence stays consistent ──
    let Ok(state) = create_initial_state(&config) else {
        return;
    };
    let blocks = input.seeds.len() as u64;
    let options = SimulationOptions::seeded(input.noise_level, input.seeds);
    let state = continue_simulation(state, blocks, input.demand_level, &options, &mut ConstantSample::default())
        .expect("seeds cover every block");

    assert_eq!(state.blocks().len() as u64, blocks);
    for (i, block) in state.blocks().iter().enumerate() {
        assert_eq!(block.number, i as u64 + 1);
        assert!(block.base_fee >= config.min_base_fee, "block {i}: fee {}", block.base_fee);
        assert!((0.0..=1.0).contains(&block.utilization));
    }
});
