use crate::config::FeeMarketConfig;

/// Calculate the next block's base fee from the current fee and the
/// utilization of the block just built.
///
/// # Formula
///
/// ```text
/// u            = clamp(utilization, 0, 1)
/// change_ratio = max_change_rate × (u − target) / target
/// next         = max(current × (1 + change_ratio), min_base_fee)
/// ```
///
/// The fee is unchanged at exactly the target, rises above it and falls below
/// it. Successive blocks compound multiplicatively.
///
/// # Note on the denominator
///
/// Both sides divide by `target_utilization`. Unlike a `(1 − target)`
/// denominator on the decreasing side, this makes the largest possible
/// decrease and increase differ whenever the target is not 0.5: with a target
/// of 0.75 a full block raises the fee by `rate / 3` but an empty block lowers
/// it by the full `rate`.
pub fn calculate_new_base_fee(current_fee: f64, utilization: f64, config: &FeeMarketConfig) -> f64 {
    let utilization = clamp_unit(utilization);
    let delta = utilization - config.target_utilization;
    let change_ratio = config.max_change_rate * (delta / config.target_utilization);
    let next = current_fee * (1.0 + change_ratio);
    // `f64::max` also maps a NaN fee to the floor.
    next.max(config.min_base_fee)
}

/// Demand that materializes at `current_fee`, given nominal `demand_level`.
///
/// ```text
/// realized = clamp(demand_level × baseline_fee / current_fee, 0, 1)
/// ```
///
/// At `current_fee == baseline_fee` the nominal demand passes through. A
/// non-positive current fee is treated as the baseline.
pub fn calculate_demand_response(demand_level: f64, current_fee: f64, baseline_fee: f64) -> f64 {
    if current_fee.is_nan() || current_fee <= 0.0 {
        return clamp_unit(demand_level);
    }
    clamp_unit(demand_level * (baseline_fee / current_fee))
}

/// Perturb `base_demand` with noise drawn from an injected sample.
///
/// ```text
/// utilization = clamp(base_demand + (sample − 0.5) × 2 × noise_level, 0, 1)
/// ```
///
/// `sample` is expected in `[0, 1]` and `noise_level` in `[0, 1]`; both are
/// clamped. With zero noise the demand passes through unchanged.
pub fn generate_utilization(base_demand: f64, noise_level: f64, sample: f64) -> f64 {
    let noise = (clamp_unit(sample) - 0.5) * 2.0 * clamp_unit(noise_level);
    clamp_unit(base_demand + noise)
}

/// Clamp to `[0, 1]`, mapping NaN to 0.
#[inline]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
