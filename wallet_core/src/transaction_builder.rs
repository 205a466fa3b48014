//! Transaction building for spend groups.

use safemig_types::{
    sum_utxos, Amount, AssetId, SafeAddress, SafeTransaction, SafeUtxo, TransactionInput,
    TransactionOutput, UserId, MAX_TRANSACTION_INPUTS, TRANSACTION_VERSION,
};
use uuid::Uuid;

use crate::error::WalletError;

/// Memo attached to every migration transfer.
pub const MIGRATION_MEMO: &str = "migrate by safemig";

/// An unsigned transaction for one spend group, keyed by its request id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub request_id: String,
    pub transaction: SafeTransaction,
    pub total: Amount,
}

/// Deterministic request id for a spend group: UUIDv5 over its output ids.
///
/// Rebuilding the same group yields the same id, so a retried run cannot
/// create a second request for outputs that are already being spent.
pub fn request_id_for(group: &[SafeUtxo]) -> String {
    let joined = group
        .iter()
        .map(|u| u.output_id.as_str())
        .collect::<Vec<_>>()
        .join(",");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, joined.as_bytes()).to_string()
}

/// Build the transaction spending every output of `group` to `receiver`
/// in a single output of the exact summed amount.
pub fn build_group_transaction(
    group: &[SafeUtxo],
    receiver: UserId,
    memo: &str,
) -> Result<UnsignedTransaction, WalletError> {
    let asset_id = validate_group(group)?;
    let total = sum_utxos(group)
        .ok_or_else(|| WalletError::TransactionBuild("input amounts overflow".into()))?;

    let transaction = SafeTransaction {
        version: TRANSACTION_VERSION,
        asset_id,
        inputs: group
            .iter()
            .map(|u| TransactionInput {
                hash: u.transaction_hash.clone(),
                index: u.output_index,
            })
            .collect(),
        outputs: vec![TransactionOutput {
            receiver: SafeAddress::single(receiver),
            amount: total,
        }],
        memo: memo.to_string(),
        signatures: Vec::new(),
    };

    Ok(UnsignedTransaction {
        request_id: request_id_for(group),
        transaction,
        total,
    })
}

fn validate_group(group: &[SafeUtxo]) -> Result<AssetId, WalletError> {
    let first = group
        .first()
        .ok_or_else(|| WalletError::TransactionBuild("spend group is empty".into()))?;
    if group.len() > MAX_TRANSACTION_INPUTS {
        return Err(WalletError::TransactionBuild(format!(
            "spend group has {} inputs, limit is {MAX_TRANSACTION_INPUTS}",
            group.len()
        )));
    }
    if let Some(other) = group.iter().find(|u| u.asset_id != first.asset_id) {
        return Err(WalletError::TransactionBuild(format!(
            "spend group mixes assets {} and {}",
            first.asset_id, other.asset_id
        )));
    }
    if let Some(spent) = group.iter().find(|u| !u.is_unspent()) {
        return Err(WalletError::TransactionBuild(format!(
            "output {} is {}",
            spent.output_id, spent.state
        )));
    }
    Ok(first.asset_id)
}
