use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("random source unavailable: {0}")]
    Random(String),

    #[error("transaction has no inputs to sign")]
    EmptyTransaction,

    #[error("expected {expected} views, ledger returned {got}")]
    ViewCountMismatch { expected: usize, got: usize },

    #[error("invalid view for input {index}: {reason}")]
    InvalidView { index: usize, reason: String },

    #[error("transaction encoding failed: {0}")]
    Encoding(String),
}
