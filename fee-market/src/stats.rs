use {
    crate::state::SimulationState,
    serde::{Deserialize, Serialize},
};

/// Summary of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub average_base_fee: f64,
    pub average_utilization: f64,
    /// Blocks with utilization strictly above the target.
    pub blocks_above_target: u64,
    /// Blocks with utilization strictly below the target.
    pub blocks_below_target: u64,
    /// Population standard deviation of block-to-block base fee changes.
    pub fee_volatility: f64,
    pub min_base_fee: f64,
    pub max_base_fee: f64,
}

/// Reduce a run to its [`Stats`].
///
/// With no blocks yet, every fee statistic reports the current base fee and
/// the counts are zero.
pub fn calculate_stats(state: &SimulationState) -> Stats {
    let blocks = state.blocks();
    if blocks.is_empty() {
        let fee = state.current_base_fee();
        return Stats {
            average_base_fee: fee,
            average_utilization: 0.0,
            blocks_above_target: 0,
            blocks_below_target: 0,
            fee_volatility: 0.0,
            min_base_fee: fee,
            max_base_fee: fee,
        };
    }

    let target = state.config().target_utilization;
    let count = blocks.len() as f64;
    let mut fee_sum = 0.0;
    let mut utilization_sum = 0.0;
    let mut min_base_fee = f64::INFINITY;
    let mut max_base_fee = f64::NEG_INFINITY;
    let mut blocks_above_target = 0u64;
    let mut blocks_below_target = 0u64;
    for block in blocks {
        fee_sum += block.base_fee;
        utilization_sum += block.utilization;
        min_base_fee = min_base_fee.min(block.base_fee);
        max_base_fee = max_base_fee.max(block.base_fee);
        if block.utilization > target {
            blocks_above_target += 1;
        } else if block.utilization < target {
            blocks_below_target += 1;
        }
    }

    let deltas: Vec<f64> = blocks
        .windows(2)
        .map(|pair| pair[1].base_fee - pair[0].base_fee)
        .collect();

    Stats {
        average_base_fee: fee_sum / count,
        average_utilization: utilization_sum / count,
        blocks_above_target,
        blocks_below_target,
        fee_volatility: population_std_dev(&deltas),
        min_base_fee,
        max_base_fee,
    }
}

fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
