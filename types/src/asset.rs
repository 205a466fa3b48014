//! Asset balances under both custody models.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::id::AssetId;

/// A balance held under the legacy (non-output-tracked) custody model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyAsset {
    pub asset_id: AssetId,
    pub balance: Amount,
    pub symbol: String,
}

/// Asset metadata served by the safe custody API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeAsset {
    pub asset_id: AssetId,
    pub symbol: String,
    #[serde(default)]
    pub name: String,
}

/// Ledger receipt for an accepted legacy transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub snapshot_id: String,
    #[serde(default)]
    pub trace_id: String,
    pub asset_id: AssetId,
    pub amount: Amount,
}
