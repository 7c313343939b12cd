//! Multi-phase demand scenarios.
//!
//! A scenario is a list of [`DemandPhase`]s run back to back through one
//! simulation, e.g. a quiet period, a mint-driven spike, then recovery.

use {
    crate::{
        config::FeeMarketConfig,
        error::Result,
        sample::SampleSource,
        simulation::{continue_simulation, create_initial_state, SimulationOptions},
        state::SimulationState,
    },
    log::info,
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandPhase {
    pub name: String,
    pub blocks: u64,
    /// Nominal demand during the phase (0–1).
    pub demand_level: f64,
}

impl DemandPhase {
    pub fn new(name: impl Into<String>, blocks: u64, demand_level: f64) -> Self {
        Self {
            name: name.into(),
            blocks,
            demand_level,
        }
    }
}

/// How the base fee moved during one phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseSummary {
    pub name: String,
    /// Number of the first block of the phase.
    pub first_block: u64,
    pub blocks: u64,
    pub start_fee: f64,
    pub end_fee: f64,
    pub peak_fee: f64,
    pub average_utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub state: SimulationState,
    pub phases: Vec<PhaseSummary>,
}

/// Run every phase in order from a fresh state.
///
/// `options.random_seeds`, when set, must cover the whole scenario; phases
/// consume consecutive slices of it.
pub fn run_scenario<S: SampleSource + ?Sized>(
    config: &FeeMarketConfig,
    phases: &[DemandPhase],
    options: &SimulationOptions,
    source: &mut S,
) -> Result<ScenarioOutcome> {
    let mut state = create_initial_state(config)?;
    let mut summaries = Vec::with_capacity(phases.len());
    let mut seed_offset = 0usize;

    for phase in phases {
        let start_fee = state.current_base_fee();
        let first_block = state.block_number().saturating_add(1);
        let phase_options = SimulationOptions {
            noise_level: options.noise_level,
            random_seeds: options
                .random_seeds
                .as_ref()
                .map(|seeds| seeds.get(seed_offset..).unwrap_or_default().to_vec()),
        };
        state = continue_simulation(state, phase.blocks, phase.demand_level, &phase_options, source)?;
        seed_offset = seed_offset.saturating_add(phase.blocks as usize);

        let summary = summarize(phase, first_block, start_fee, &state);
        info!(
            "phase {}: {} blocks, base fee {:.4} -> {:.4} (peak {:.4})",
            summary.name, summary.blocks, summary.start_fee, summary.end_fee, summary.peak_fee
        );
        summaries.push(summary);
    }

    Ok(ScenarioOutcome {
        state,
        phases: summaries,
    })
}

fn summarize(phase: &DemandPhase, first_block: u64, start_fee: f64, state: &SimulationState) -> PhaseSummary {
    let blocks = state.blocks();
    let phase_blocks = &blocks[blocks.len().saturating_sub(phase.blocks as usize)..];
    let peak_fee = phase_blocks
        .iter()
        .map(|block| block.base_fee)
        .chain(std::iter::once(state.current_base_fee()))
        .fold(start_fee, f64::max);
    let average_utilization = if phase_blocks.is_empty() {
        0.0
    } else {
        phase_blocks.iter().map(|block| block.utilization).sum::<f64>() / phase_blocks.len() as f64
    };
    PhaseSummary {
        name: phase.name.clone(),
        first_block,
        blocks: phase.blocks,
        start_fee,
        end_fee: state.current_base_fee(),
        peak_fee,
        average_utilization,
    }
}
