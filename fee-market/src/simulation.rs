//! Block-by-block simulation driver.
//!
//! Each block closes the feedback loop
//!
//! ```text
//! base fee ─► demand response ─► utilization (+ noise) ─► next base fee
//! ```
//!
//! A run is a [`SimulationState`] value threaded through [`process_block`] or
//! [`continue_simulation`]. There is no stop operation: a caller that stops
//! advancing a state has stopped the run.

use {
    crate::{
        calculator::{calculate_demand_response, generate_utilization},
        config::FeeMarketConfig,
        error::{FeeError, Result},
        sample::{SampleSource, SeedSequence},
        state::SimulationState,
    },
    log::{info, trace},
    serde::{Deserialize, Serialize},
};

/// Knobs of [`run_simulation`] beyond the config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationOptions {
    /// Amplitude of block-to-block noise around realized demand (0–1).
    pub noise_level: f64,
    /// Fixed samples, one per block, consumed in order. When set, the injected
    /// [`SampleSource`] is not used.
    pub random_seeds: Option<Vec<f64>>,
}

impl SimulationOptions {
    pub fn with_noise(noise_level: f64) -> Self {
        Self {
            noise_level,
            random_seeds: None,
        }
    }

    pub fn seeded(noise_level: f64, random_seeds: Vec<f64>) -> Self {
        Self {
            noise_level,
            random_seeds: Some(random_seeds),
        }
    }
}

/// State before the first block.
pub fn create_initial_state(config: &FeeMarketConfig) -> Result<SimulationState> {
    SimulationState::new(*config)
}

/// Process one block at `utilization`, leaving `state` untouched.
pub fn process_block(state: &SimulationState, utilization: f64) -> SimulationState {
    state.clone().advance(utilization)
}

/// Utilization the next block realizes under nominal `demand_level`.
pub fn next_utilization(state: &SimulationState, demand_level: f64, noise_level: f64, sample: f64) -> f64 {
    let realized = calculate_demand_response(
        demand_level,
        state.current_base_fee(),
        state.config().baseline_fee,
    );
    generate_utilization(realized, noise_level, sample)
}

/// Run `block_count` blocks from a fresh state.
///
/// Samples come from `options.random_seeds` when present, otherwise from
/// `source`. Identical arguments (with seeds, or with an identically seeded
/// source) produce identical histories.
///
/// Only `options.random_seeds` is length-checked
/// ([`FeeError::InsufficientSeeds`]). A [`SeedSequence`] passed directly as
/// `source` is not: once exhausted it yields the noise-free midpoint and logs
/// a warning. Compare [`SeedSequence::remaining`] with `block_count` first if
/// that matters.
pub fn run_simulation<S: SampleSource + ?Sized>(
    block_count: u64,
    demand_level: f64,
    config: &FeeMarketConfig,
    options: &SimulationOptions,
    source: &mut S,
) -> Result<SimulationState> {
    let state = create_initial_state(config)?;
    info!(
        "simulating {} blocks at demand {:.3} (noise {:.3}, seeded: {})",
        block_count,
        demand_level,
        options.noise_level,
        options.random_seeds.is_some()
    );
    let state = continue_simulation(state, block_count, demand_level, options, source)?;
    info!(
        "simulation finished after {} blocks, base fee {:.4}",
        state.block_number(),
        state.current_base_fee()
    );
    Ok(state)
}

/// Advance an existing run by `block_count` blocks.
///
/// Sample handling is the same as in [`run_simulation`].
pub fn continue_simulation<S: SampleSource + ?Sized>(
    state: SimulationState,
    block_count: u64,
    demand_level: f64,
    options: &SimulationOptions,
    source: &mut S,
) -> Result<SimulationState> {
    match &options.random_seeds {
        Some(seeds) => {
            let provided = seeds.len() as u64;
            if provided < block_count {
                return Err(FeeError::InsufficientSeeds {
                    required: block_count,
                    provided,
                });
            }
            let mut seeds = SeedSequence::new(seeds);
            Ok(drive(state, block_count, demand_level, options.noise_level, &mut seeds))
        }
        None => Ok(drive(state, block_count, demand_level, options.noise_level, source)),
    }
}

fn drive<S: SampleSource + ?Sized>(
    mut state: SimulationState,
    block_count: u64,
    demand_level: f64,
    noise_level: f64,
    source: &mut S,
) -> SimulationState {
    for _ in 0..block_count {
        let utilization = next_utilization(&state, demand_level, noise_level, source.next_sample());
        trace!(
            "block {}: base fee {:.4}, utilization {:.4}",
            state.block_number().saturating_add(1),
            state.current_base_fee(),
            utilization
        );
        state = state.advance(utilization);
    }
    state
}
