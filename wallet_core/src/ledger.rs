//! The ledger operations a migration needs, as a trait.
//!
//! [`crate::client::HttpLedgerClient`] talks to the real API;
//! `safemig_nullables::NullLedger` stands in for it in tests.

use async_trait::async_trait;
use safemig_types::{
    Amount, AssetId, LegacyAsset, PrivateKey, PublicKey, SafeAsset, SafeUtxo, Snapshot,
    TransactionRequest, TransactionRequestInput, UserId, UtxoState,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::WalletError;

/// A legacy transfer of one asset to another user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferInput {
    pub asset_id: AssetId,
    pub opponent_id: UserId,
    pub amount: Amount,
    /// Idempotency token for this transfer.
    pub trace_id: String,
    pub memo: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("ASC"),
            Self::Desc => f.write_str("DESC"),
        }
    }
}

/// One page request against the wallet's safe outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UtxoQuery {
    /// Smallest sequence number to return.
    pub offset: u64,
    pub limit: u32,
    pub order: SortOrder,
    pub state: UtxoState,
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// List the wallet's legacy balances.
    async fn read_assets(&self) -> Result<Vec<LegacyAsset>, WalletError>;

    /// Transfer a legacy balance, authorized by `pin`.
    async fn transfer(&self, input: &TransferInput, pin: &str) -> Result<Snapshot, WalletError>;

    /// Replace the authorization secret with `new_public_key`, authorized by `old_pin`.
    async fn modify_pin(&self, old_pin: &str, new_public_key: &PublicKey)
        -> Result<(), WalletError>;

    /// Activate safe custody with `spend_key`, authorized by `pin`.
    async fn safe_migrate(&self, spend_key: &PrivateKey, pin: &str) -> Result<(), WalletError>;

    /// Fetch one page of the wallet's safe outputs.
    async fn list_utxos(&self, query: &UtxoQuery) -> Result<Vec<SafeUtxo>, WalletError>;

    async fn read_safe_asset(&self, asset_id: &AssetId) -> Result<SafeAsset, WalletError>;

    /// Register an unsigned transaction and receive the views needed to sign it.
    async fn create_transaction_request(
        &self,
        input: &TransactionRequestInput,
    ) -> Result<TransactionRequest, WalletError>;

    /// Submit the signed transaction for a previously created request.
    async fn submit_transaction_request(
        &self,
        input: &TransactionRequestInput,
    ) -> Result<TransactionRequest, WalletError>;
}
