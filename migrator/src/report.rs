use safemig_types::{Amount, AssetId};

use crate::pipeline::SettledGroup;

/// A legacy balance moved to the receiver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyTransfer {
    pub asset_id: AssetId,
    pub symbol: String,
    pub amount: Amount,
    pub snapshot_id: String,
}

/// All spend groups settled for one asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SafeAssetDrain {
    pub asset_id: AssetId,
    pub symbol: String,
    pub total: Amount,
    pub groups: Vec<SettledGroup>,
}

/// What a run actually changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub legacy_transfers: Vec<LegacyTransfer>,
    pub pin_rotated: bool,
    pub safe_activated: bool,
    pub safe_assets: Vec<SafeAssetDrain>,
}

impl MigrationReport {
    pub fn groups_settled(&self) -> usize {
        self.safe_assets.iter().map(|a| a.groups.len()).sum()
    }

    pub fn outputs_spent(&self) -> usize {
        self.safe_assets
            .iter()
            .flat_map(|a| &a.groups)
            .map(|g| g.inputs)
            .sum()
    }

    /// True when the run found nothing left to do.
    pub fn is_noop(&self) -> bool {
        self.legacy_transfers.is_empty()
            && !self.pin_rotated
            && !self.safe_activated
            && self.safe_assets.is_empty()
    }
}
