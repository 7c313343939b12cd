use thiserror::Error;

/// Errors produced by the fee-market subsystem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeError {
    /// The configuration is invalid (e.g. target utilization outside (0, 1)).
    #[error("Invalid fee market configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A deterministic run was given fewer samples than blocks.
    #[error("Insufficient random seeds: {required} blocks requested but only {provided} seeds supplied")]
    InsufficientSeeds { required: u64, provided: u64 },

    /// A configuration source could not be parsed.
    #[error("Failed to parse fee market configuration: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, FeeError>;
