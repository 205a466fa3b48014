//! Grouping of safe outputs into spend groups.
//!
//! A transaction may spend at most [`MAX_TRANSACTION_INPUTS`] outputs, all of a
//! single asset. Draining a wallet therefore splits each asset's outputs into
//! consecutive chunks of at most the configured size, preserving the order in
//! which the outputs were enumerated.

use safemig_types::{AssetId, SafeUtxo, MAX_TRANSACTION_INPUTS};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::WalletError;

/// Maximum number of outputs spent by one transaction, in `1..=256`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpendGroupSize(usize);

impl SpendGroupSize {
    pub const MAX: Self = Self(MAX_TRANSACTION_INPUTS);

    pub fn new(size: usize) -> Result<Self, WalletError> {
        if (1..=MAX_TRANSACTION_INPUTS).contains(&size) {
            Ok(Self(size))
        } else {
            Err(WalletError::InvalidSpendGroupSize(size))
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for SpendGroupSize {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Display for SpendGroupSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Partition outputs by asset, keeping each asset's outputs in input order.
/// Assets iterate in ascending id order.
pub fn group_by_asset(utxos: Vec<SafeUtxo>) -> BTreeMap<AssetId, Vec<SafeUtxo>> {
    let mut by_asset: BTreeMap<AssetId, Vec<SafeUtxo>> = BTreeMap::new();
    for utxo in utxos {
        by_asset.entry(utxo.asset_id).or_default().push(utxo);
    }
    by_asset
}

/// Split one asset's outputs into consecutive groups of at most `size`.
///
/// Yields `ceil(n / size)` non-empty groups; only the last may be short.
pub fn spend_groups(utxos: &[SafeUtxo], size: SpendGroupSize) -> Vec<Vec<SafeUtxo>> {
    utxos.chunks(size.get()).map(<[SafeUtxo]>::to_vec).collect()
}
