use {
    crate::{
        calculator::{calculate_new_base_fee, clamp_unit},
        config::FeeMarketConfig,
        error::Result,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

/// One simulated block.
///
/// Records the base fee that was in effect while the block was built and the
/// utilization it realized. Never modified after it is appended.
#[derive(
    Debug, Clone, Copy, PartialEq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct BlockRecord {
    /// 1-based block number.
    pub number: u64,
    pub base_fee: f64,
    /// Realized utilization, always within `[0, 1]`.
    pub utilization: f64,
}

/// State of one simulation run.
///
/// Values are immutable from the outside: every transition returns a new
/// state. This keeps runs replayable and lets callers hold on to any earlier
/// state for comparison.
///
/// Invariants:
/// - `blocks().len() == block_number()`
/// - `current_base_fee() >= config().min_base_fee`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationState {
    config: FeeMarketConfig,
    block_number: u64,
    current_base_fee: f64,
    blocks: Vec<BlockRecord>,
}

impl SimulationState {
    /// Create the state before the first block. Fails on an invalid config.
    pub fn new(config: FeeMarketConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            block_number: 0,
            current_base_fee: config.initial_base_fee,
            blocks: Vec::new(),
        })
    }

    /// Build the next block at `utilization` and derive the following fee.
    ///
    /// Consumes `self`; use [`crate::simulation::process_block`] to keep the
    /// previous state around.
    pub fn advance(mut self, utilization: f64) -> Self {
        let utilization = clamp_unit(utilization);
        let number = self.block_number.saturating_add(1);
        self.blocks.push(BlockRecord {
            number,
            base_fee: self.current_base_fee,
            utilization,
        });
        self.current_base_fee = calculate_new_base_fee(self.current_base_fee, utilization, &self.config);
        self.block_number = number;
        self
    }

    pub fn config(&self) -> &FeeMarketConfig {
        &self.config
    }

    /// Number of blocks processed so far.
    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    /// Base fee that the next block will be built at.
    pub fn current_base_fee(&self) -> f64 {
        self.current_base_fee
    }

    pub fn blocks(&self) -> &[BlockRecord] {
        &self.blocks
    }

    pub fn last_block(&self) -> Option<&BlockRecord> {
        self.blocks.last()
    }

    /// Borsh encoding of the block history.
    ///
    /// Two runs are identical exactly when these bytes are equal.
    pub fn history_bytes(&self) -> std::io::Result<Vec<u8>> {
        borsh::to_vec(&self.blocks)
    }
}
