//! Settlement of one spend group: build, request, sign, submit.

use safemig_crypto::sign_transaction;
use safemig_types::{Amount, PrivateKey, SafeUtxo, TransactionRequestInput, UserId};
use safemig_wallet_core::{build_group_transaction, LedgerClient, WalletError, MIGRATION_MEMO};

use crate::error::MigrationError;

/// The wallet is the sole member of every output it owns.
pub const SIGNER_INDEX: u16 = 0;

/// A spend group the ledger has accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettledGroup {
    pub request_id: String,
    pub transaction_hash: String,
    pub inputs: usize,
    pub amount: Amount,
}

/// Spend every output of `group` to `receiver` in one transaction.
///
/// Once the submit call succeeds the transfer cannot be undone.
pub async fn settle_group(
    ledger: &dyn LedgerClient,
    group: &[SafeUtxo],
    receiver: UserId,
    spend_key: &PrivateKey,
) -> Result<SettledGroup, MigrationError> {
    let asset_id = group.first().ok_or(MigrationError::EmptyGroup)?.asset_id;
    let build_err = |source: WalletError| MigrationError::Build { asset_id, source };

    let unsigned = build_group_transaction(group, receiver, MIGRATION_MEMO).map_err(build_err)?;
    let mut tx = unsigned.transaction;
    let raw = tx
        .dump()
        .map_err(|e| build_err(WalletError::TransactionBuild(e.to_string())))?;

    let request = ledger
        .create_transaction_request(&TransactionRequestInput {
            request_id: unsigned.request_id.clone(),
            raw,
        })
        .await
        .map_err(|source| MigrationError::CreateRequest {
            request_id: unsigned.request_id.clone(),
            source,
        })?;
    tracing::debug!(
        request_id = %request.request_id,
        views = request.views.len(),
        "transaction request created"
    );

    sign_transaction(&mut tx, spend_key, &request.views, SIGNER_INDEX).map_err(|source| {
        MigrationError::Sign {
            request_id: request.request_id.clone(),
            source,
        }
    })?;
    let signed_raw = tx
        .dump()
        .map_err(|e| build_err(WalletError::TransactionBuild(e.to_string())))?;

    let submitted = ledger
        .submit_transaction_request(&TransactionRequestInput {
            request_id: request.request_id.clone(),
            raw: signed_raw,
        })
        .await
        .map_err(|source| MigrationError::SubmitRequest {
            request_id: request.request_id,
            source,
        })?;

    Ok(SettledGroup {
        request_id: submitted.request_id,
        transaction_hash: submitted.transaction_hash,
        inputs: group.len(),
        amount: unsigned.total,
    })
}
