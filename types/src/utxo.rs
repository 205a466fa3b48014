//! Unspent transaction outputs under safe custody.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::Amount;
use crate::id::AssetId;

/// Lifecycle state of a safe output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtxoState {
    /// Spendable.
    Unspent,
    /// Referenced by a signed transaction that has not been finalized yet.
    Signed,
    /// Consumed by a finalized transaction.
    Spent,
}

impl UtxoState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspent => "unspent",
            Self::Signed => "signed",
            Self::Spent => "spent",
        }
    }
}

impl fmt::Display for UtxoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single safe output owned by the wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeUtxo {
    pub output_id: String,
    /// Hash of the transaction that created this output.
    pub transaction_hash: String,
    /// Position of this output within that transaction.
    pub output_index: u32,
    pub asset_id: AssetId,
    pub amount: Amount,
    /// Ledger-assigned, strictly increasing per wallet. Never reused.
    pub sequence: u64,
    pub state: UtxoState,
}

impl SafeUtxo {
    pub fn is_unspent(&self) -> bool {
        self.state == UtxoState::Unspent
    }
}

/// Exact sum of the outputs' amounts, `None` on overflow.
pub fn sum_utxos(utxos: &[SafeUtxo]) -> Option<Amount> {
    Amount::checked_sum(utxos.iter().map(|u| u.amount))
}
