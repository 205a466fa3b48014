use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("failed to read keystore {}: {source}", path.display())]
    KeystoreRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write keystore {}: {source}", path.display())]
    KeystoreWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid keystore JSON: {0}")]
    KeystoreParse(serde_json::Error),

    #[error("keystore serialization failed: {0}")]
    KeystoreSerialize(serde_json::Error),

    #[error("invalid session key: {0}")]
    InvalidSessionKey(String),

    #[error("key error: {0}")]
    Key(#[from] safemig_crypto::CryptoError),

    #[error("ledger error {code}: {description}")]
    Ledger { code: i64, description: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("transaction building error: {0}")]
    TransactionBuild(String),

    #[error("invalid spend group size {0}: must be between 1 and 256")]
    InvalidSpendGroupSize(usize),

    #[error("identity lookup failed: {0}")]
    Lookup(String),
}
