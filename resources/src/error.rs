use {
    crate::catalog::{ResourceId, TransactionTypeId},
    thiserror::Error,
};

/// Errors produced by catalog construction and block packing.
///
/// These are configuration or programmer errors. Numeric fluctuations are
/// clamped by the engine and never surface here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// Two resources in the catalog share the same id.
    #[error("Duplicate resource id: {0}")]
    DuplicateResource(ResourceId),

    /// Two transaction types in the catalog share the same id.
    #[error("Duplicate transaction type id: {0}")]
    DuplicateTransactionType(TransactionTypeId),

    /// A transaction type consumes a resource the catalog does not define.
    #[error("Transaction type {transaction_type} references unknown resource {resource}")]
    UnknownResource {
        transaction_type: TransactionTypeId,
        resource: ResourceId,
    },

    /// A resource's capacity is zero, negative, or not a finite number.
    #[error(
        "Resource {resource} has invalid max throughput {max_throughput} \
         (must be positive and finite)"
    )]
    InvalidThroughput {
        resource: ResourceId,
        max_throughput: f64,
    },

    /// A per-instance consumption value is negative or not finite.
    #[error(
        "Transaction type {transaction_type} has invalid consumption {amount} \
         of resource {resource}"
    )]
    InvalidConsumption {
        transaction_type: TransactionTypeId,
        resource: ResourceId,
        amount: f64,
    },

    /// A batch refers to a transaction type the catalog does not define.
    #[error("Unknown transaction type: {0}")]
    UnknownTransactionType(TransactionTypeId),

    /// Transactions are added in counts of at least one.
    #[error("Transaction count must be at least 1")]
    ZeroCount,

    /// The catalog source could not be parsed.
    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    /// The catalog could not be rendered to TOML.
    #[error("Failed to serialize catalog: {0}")]
    Serialize(String),
}

pub type Result<T> = std::result::Result<T, ResourceError>;
