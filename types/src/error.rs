//! Error types shared across crates.

use thiserror::Error;

/// Failure to parse a decimal amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,

    #[error("negative amount: {0}")]
    Negative(String),

    #[error("malformed amount: {0}")]
    Malformed(String),

    #[error("amount has more than 8 fractional digits: {0}")]
    TooPrecise(String),

    #[error("amount out of range: {0}")]
    Overflow(String),
}

/// Common error type for the shared data model.
#[derive(Debug, Error)]
pub enum TypesError {
    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid spend group: {reason}")]
    InvalidSpendGroup { reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}
