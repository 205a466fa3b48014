use safemig_crypto::CryptoError;
use safemig_types::{AssetId, PublicKey, UserId};
use safemig_wallet_core::WalletError;
use thiserror::Error;

use crate::phase::Phase;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("receiver lookup failed: {0}")]
    ReceiverLookup(#[source] WalletError),

    #[error("receiver {0} is not a messenger user")]
    ReceiverNotMessengerUser(UserId),

    #[error("receiver {0} is this wallet")]
    ReceiverIsSelf(UserId),

    #[error("{phase} failed: {source}")]
    Ledger {
        phase: Phase,
        #[source]
        source: WalletError,
    },

    #[error("{phase}: key generation failed: {source}")]
    KeyGeneration {
        phase: Phase,
        #[source]
        source: WalletError,
    },

    /// The ledger accepted a new secret that the keystore file does not hold.
    #[error(
        "{phase}: the ledger now expects the {secret} with public key {}, but the keystore \
         could not be saved; the in-memory {secret} differs from the on-disk one and must be \
         reconciled manually: {source}",
        hex_key(public_key)
    )]
    Persist {
        phase: Phase,
        secret: &'static str,
        public_key: PublicKey,
        #[source]
        source: WalletError,
    },

    #[error("keystore spend key is missing or not a valid private key")]
    InvalidSpendKey,

    #[error("amount overflow summing outputs of asset {0}")]
    AmountOverflow(AssetId),

    #[error("spend group is empty")]
    EmptyGroup,

    #[error("failed to build transaction for asset {asset_id}: {source}")]
    Build {
        asset_id: AssetId,
        #[source]
        source: WalletError,
    },

    #[error("ledger rejected transaction request {request_id}: {source}")]
    CreateRequest {
        request_id: String,
        #[source]
        source: WalletError,
    },

    /// The group may or may not be settled; re-running resubmits under the same id.
    #[error("failed to submit signed transaction request {request_id}: {source}")]
    SubmitRequest {
        request_id: String,
        #[source]
        source: WalletError,
    },

    #[error("failed to sign transaction request {request_id}: {source}")]
    Sign {
        request_id: String,
        #[source]
        source: CryptoError,
    },
}

fn hex_key(key: &PublicKey) -> String {
    safemig_crypto::encode_public_key(key)
}
