//! Wallet core library for safemig.
//!
//! Provides the wallet-side pieces a migration run needs:
//! - Keystore loading and in-place persistence
//! - Authenticated ledger API client behind the [`LedgerClient`] trait
//! - Receiver identity lookup
//! - Spend group batching and transaction building

pub mod auth;
pub mod client;
pub mod error;
pub mod identity;
pub mod keys;
pub mod keystore;
pub mod ledger;
pub mod spend_groups;
pub mod transaction_builder;

pub use auth::{pin_proof, PinProof, SessionAuth};
pub use client::{HttpLedgerClient, DEFAULT_API_BASE};
pub use error::WalletError;
pub use identity::{IdentityClient, IdentityLookup, UserProfile, DEFAULT_LOOKUP_BASE};
pub use keys::{KeySource, OsKeySource};
pub use keystore::{load_keystore, save_keystore, FileKeystore, Keystore, KeystoreStore};
pub use ledger::{LedgerClient, SortOrder, TransferInput, UtxoQuery};
pub use spend_groups::{group_by_asset, spend_groups, SpendGroupSize};
pub use transaction_builder::{
    build_group_transaction, request_id_for, UnsignedTransaction, MIGRATION_MEMO,
};
