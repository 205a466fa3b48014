//! Fundamental types for safemig.
//!
//! This crate defines the data model shared across every other crate in the workspace:
//! identifiers, decimal amounts, keys, legacy balances, safe outputs, and transactions.

pub mod amount;
pub mod asset;
pub mod error;
pub mod id;
pub mod keys;
pub mod transaction;
pub mod utxo;

pub use amount::Amount;
pub use asset::{LegacyAsset, SafeAsset, Snapshot};
pub use error::{AmountError, TypesError};
pub use id::{AssetId, UserId};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use transaction::{
    SafeAddress, SafeTransaction, TransactionInput, TransactionOutput, TransactionRequest,
    TransactionRequestInput, MAX_TRANSACTION_INPUTS, TRANSACTION_VERSION,
};
pub use utxo::{sum_utxos, SafeUtxo, UtxoState};
