use {
    crate::error::{FeeError, Result},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

/// Configuration for the EIP-1559-style base fee controller.
///
/// A run is parameterized by one config and never changes it. Fees are plain
/// `f64` values in an abstract fee unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(default)]
pub struct FeeMarketConfig {
    /// Block utilization (0–1, exclusive) at which the base fee holds steady.
    /// 0.5 means half-full blocks are "on target", like Ethereum.
    pub target_utilization: f64,

    /// Largest relative fee change per block, reached at 0 % or 100 %
    /// utilization when the target is 0.5. 0.125 means ±12.5 %.
    pub max_change_rate: f64,

    /// Floor of the base fee. Prevents the fee from decaying to zero under
    /// sustained low usage.
    pub min_base_fee: f64,

    /// Base fee of the first simulated block.
    pub initial_base_fee: f64,

    /// Reference fee for demand elasticity: at this fee, realized demand
    /// equals nominal demand.
    pub baseline_fee: f64,
}

impl Default for FeeMarketConfig {
    fn default() -> Self {
        Self {
            target_utilization: 0.5,
            max_change_rate: 0.125,
            min_base_fee: 1.0,
            initial_base_fee: 20.0,
            baseline_fee: 20.0,
        }
    }
}

impl FeeMarketConfig {
    /// Parse a config from TOML. Missing keys keep their default values.
    ///
    /// ```toml
    /// target_utilization = 0.5
    /// max_change_rate = 0.125
    /// initial_base_fee = 20.0
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|err| FeeError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate that the config is internally consistent.
    ///
    /// The fee update divides by `target_utilization`, so it must be strictly
    /// positive. Every fee must be positive and finite, and the initial fee may
    /// not start below the floor.
    pub fn validate(&self) -> Result<()> {
        if !(self.target_utilization > 0.0 && self.target_utilization < 1.0) {
            return Err(invalid(format!(
                "target_utilization ({}) must be in (0, 1)",
                self.target_utilization
            )));
        }
        if !(self.max_change_rate > 0.0 && self.max_change_rate < 1.0) {
            return Err(invalid(format!(
                "max_change_rate ({}) must be in (0, 1)",
                self.max_change_rate
            )));
        }
        for (name, fee) in [
            ("min_base_fee", self.min_base_fee),
            ("initial_base_fee", self.initial_base_fee),
            ("baseline_fee", self.baseline_fee),
        ] {
            if !(fee.is_finite() && fee > 0.0) {
                return Err(invalid(format!("{name} ({fee}) must be positive and finite")));
            }
        }
        if self.initial_base_fee < self.min_base_fee {
            return Err(invalid(format!(
                "initial_base_fee ({}) < min_base_fee ({})",
                self.initial_base_fee, self.min_base_fee
            )));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> FeeError {
    FeeError::InvalidConfig { reason }
}
