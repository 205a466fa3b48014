//! Nullable ledger: an in-memory wallet that records every call.

use async_trait::async_trait;
use safemig_crypto::{blake2b_256_multi, hash_transaction, public_from_private, verify_transaction};
use safemig_types::{
    Amount, AssetId, LegacyAsset, PrivateKey, PublicKey, SafeAsset, SafeTransaction, SafeUtxo,
    Snapshot, TransactionRequest, TransactionRequestInput, UtxoState,
};
use safemig_wallet_core::{LedgerClient, TransferInput, UtxoQuery, WalletError};
use std::collections::HashMap;
use std::sync::Mutex;

/// One recorded ledger call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerCall {
    ReadAssets,
    Transfer(TransferInput),
    ModifyPin(PublicKey),
    SafeMigrate(PublicKey),
    ListUtxos(UtxoQuery),
    ReadSafeAsset(AssetId),
    CreateRequest(String),
    SubmitRequest(String),
}

/// Ledger operations that can be made to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LedgerOp {
    ReadAssets,
    Transfer,
    ModifyPin,
    SafeMigrate,
    ListUtxos,
    ReadSafeAsset,
    CreateRequest,
    SubmitRequest,
}

struct PendingRequest {
    unsigned: SafeTransaction,
    views: Vec<String>,
}

#[derive(Default)]
struct State {
    legacy: Vec<LegacyAsset>,
    utxos: Vec<SafeUtxo>,
    safe_assets: HashMap<AssetId, SafeAsset>,
    pin_key: Option<PublicKey>,
    spend_key: Option<PublicKey>,
    requests: HashMap<String, PendingRequest>,
    calls: Vec<LedgerCall>,
    failures: HashMap<LedgerOp, (i64, String)>,
    withheld_views: usize,
    next_snapshot: u64,
}

/// An in-memory ledger for testing.
///
/// Transfers zero the legacy balance, submitted transactions mark their inputs
/// spent, and submitted signatures are checked against the registered spend
/// key. Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullLedger {
    state: Mutex<State>,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_legacy_balance(self, asset_id: AssetId, symbol: &str, balance: &str) -> Self {
        self.add_legacy_balance(asset_id, symbol, balance);
        self
    }

    pub fn add_legacy_balance(&self, asset_id: AssetId, symbol: &str, balance: &str) {
        let mut state = self.state.lock().unwrap();
        state.legacy.push(LegacyAsset {
            asset_id,
            balance: balance.parse().unwrap(),
            symbol: symbol.to_string(),
        });
    }

    /// Add an unspent output. Sequence numbers are assigned in insertion order.
    pub fn add_utxo(&self, asset_id: AssetId, amount: &str) -> SafeUtxo {
        let sequence = self.state.lock().unwrap().utxos.len() as u64 + 1;
        self.add_utxo_at(asset_id, amount, sequence)
    }

    /// Add an unspent output with an explicit sequence number.
    pub fn add_utxo_at(&self, asset_id: AssetId, amount: &str, sequence: u64) -> SafeUtxo {
        let mut state = self.state.lock().unwrap();
        let utxo = SafeUtxo {
            output_id: format!("output-{sequence}"),
            transaction_hash: hex::encode(blake2b_256_multi(&[&sequence.to_le_bytes()])),
            output_index: 0,
            asset_id,
            amount: amount.parse().unwrap(),
            sequence,
            state: UtxoState::Unspent,
        };
        state.utxos.push(utxo.clone());
        state
            .safe_assets
            .entry(asset_id)
            .or_insert_with(|| SafeAsset {
                asset_id,
                symbol: format!("A{}", &asset_id.to_string()[..4]),
                name: String::new(),
            });
        utxo
    }

    /// Register the spend key as if safe custody were already active.
    pub fn set_spend_key(&self, key: PublicKey) {
        self.state.lock().unwrap().spend_key = Some(key);
    }

    /// Make every subsequent call of `op` fail with the given ledger error.
    pub fn fail(&self, op: LedgerOp, code: i64, description: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(op, (code, description.to_string()));
    }

    /// Return `n` fewer views than inputs from every created request.
    pub fn withhold_views(&self, n: usize) {
        self.state.lock().unwrap().withheld_views = n;
    }

    pub fn created_requests(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                LedgerCall::CreateRequest(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    pub fn calls(&self) -> Vec<LedgerCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn transfers(&self) -> Vec<TransferInput> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                LedgerCall::Transfer(input) => Some(input),
                _ => None,
            })
            .collect()
    }

    pub fn submitted_requests(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                LedgerCall::SubmitRequest(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, LedgerCall::ListUtxos(_)))
            .count()
    }

    pub fn pin_key(&self) -> Option<PublicKey> {
        self.state.lock().unwrap().pin_key.clone()
    }

    pub fn spend_key(&self) -> Option<PublicKey> {
        self.state.lock().unwrap().spend_key.clone()
    }

    pub fn unspent(&self) -> Vec<SafeUtxo> {
        self.state
            .lock()
            .unwrap()
            .utxos
            .iter()
            .filter(|u| u.is_unspent())
            .cloned()
            .collect()
    }

    pub fn legacy_balances(&self) -> Vec<LegacyAsset> {
        self.state.lock().unwrap().legacy.clone()
    }

    /// Record `call` and return the injected failure for `op`, if any.
    fn enter(&self, op: LedgerOp, call: LedgerCall) -> Result<(), WalletError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.failures.get(&op) {
            Some((code, description)) => Err(WalletError::Ledger {
                code: *code,
                description: description.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn rejected(description: impl Into<String>) -> WalletError {
    WalletError::Ledger {
        code: 10002,
        description: description.into(),
    }
}

#[async_trait]
impl LedgerClient for NullLedger {
    async fn read_assets(&self) -> Result<Vec<LegacyAsset>, WalletError> {
        self.enter(LedgerOp::ReadAssets, LedgerCall::ReadAssets)?;
        Ok(self.legacy_balances())
    }

    async fn transfer(&self, input: &TransferInput, _pin: &str) -> Result<Snapshot, WalletError> {
        self.enter(LedgerOp::Transfer, LedgerCall::Transfer(input.clone()))?;
        let mut state = self.state.lock().unwrap();
        let asset = state
            .legacy
            .iter_mut()
            .find(|a| a.asset_id == input.asset_id)
            .ok_or_else(|| rejected("unknown asset"))?;
        if asset.balance != input.amount {
            return Err(rejected("amount does not match balance"));
        }
        asset.balance = Amount::ZERO;
        state.next_snapshot += 1;
        Ok(Snapshot {
            snapshot_id: format!("snapshot-{}", state.next_snapshot),
            trace_id: input.trace_id.clone(),
            asset_id: input.asset_id,
            amount: input.amount,
        })
    }

    async fn modify_pin(
        &self,
        _old_pin: &str,
        new_public_key: &PublicKey,
    ) -> Result<(), WalletError> {
        self.enter(LedgerOp::ModifyPin, LedgerCall::ModifyPin(new_public_key.clone()))?;
        self.state.lock().unwrap().pin_key = Some(new_public_key.clone());
        Ok(())
    }

    async fn safe_migrate(&self, spend_key: &PrivateKey, _pin: &str) -> Result<(), WalletError> {
        let public = public_from_private(spend_key);
        self.enter(LedgerOp::SafeMigrate, LedgerCall::SafeMigrate(public.clone()))?;
        self.state.lock().unwrap().spend_key = Some(public);
        Ok(())
    }

    async fn list_utxos(&self, query: &UtxoQuery) -> Result<Vec<SafeUtxo>, WalletError> {
        self.enter(LedgerOp::ListUtxos, LedgerCall::ListUtxos(query.clone()))?;
        let state = self.state.lock().unwrap();
        Ok(state
            .utxos
            .iter()
            .filter(|u| u.state == query.state && u.sequence >= query.offset)
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn read_safe_asset(&self, asset_id: &AssetId) -> Result<SafeAsset, WalletError> {
        self.enter(LedgerOp::ReadSafeAsset, LedgerCall::ReadSafeAsset(*asset_id))?;
        self.state
            .lock()
            .unwrap()
            .safe_assets
            .get(asset_id)
            .cloned()
            .ok_or_else(|| rejected("asset not found"))
    }

    async fn create_transaction_request(
        &self,
        input: &TransactionRequestInput,
    ) -> Result<TransactionRequest, WalletError> {
        self.enter(
            LedgerOp::CreateRequest,
            LedgerCall::CreateRequest(input.request_id.clone()),
        )?;
        let unsigned = SafeTransaction::load(&input.raw)
            .map_err(|e| rejected(format!("invalid raw transaction: {e}")))?;
        let mut state = self.state.lock().unwrap();
        let issued = unsigned.inputs.len().saturating_sub(state.withheld_views) as u32;
        let views: Vec<String> = (0..issued)
            .map(|i| {
                hex::encode(blake2b_256_multi(&[
                    input.request_id.as_bytes(),
                    &i.to_le_bytes(),
                ]))
            })
            .collect();

        state.requests.insert(
            input.request_id.clone(),
            PendingRequest {
                unsigned,
                views: views.clone(),
            },
        );
        Ok(TransactionRequest {
            request_id: input.request_id.clone(),
            transaction_hash: String::new(),
            views,
            state: "unspent".into(),
        })
    }

    async fn submit_transaction_request(
        &self,
        input: &TransactionRequestInput,
    ) -> Result<TransactionRequest, WalletError> {
        self.enter(
            LedgerOp::SubmitRequest,
            LedgerCall::SubmitRequest(input.request_id.clone()),
        )?;
        let signed = SafeTransaction::load(&input.raw)
            .map_err(|e| rejected(format!("invalid raw transaction: {e}")))?;

        let mut state = self.state.lock().unwrap();
        let pending = state
            .requests
            .get(&input.request_id)
            .ok_or_else(|| rejected("unknown request"))?;
        let hash = hash_transaction(&signed).map_err(|e| rejected(e.to_string()))?;
        if hash_transaction(&pending.unsigned).map_err(|e| rejected(e.to_string()))? != hash {
            return Err(rejected("transaction differs from request"));
        }
        let spend_key = state
            .spend_key
            .clone()
            .ok_or_else(|| rejected("safe custody not active"))?;
        if !verify_transaction(&signed, &spend_key, &pending.views, 0) {
            return Err(rejected("invalid signature"));
        }

        for input_ref in &signed.inputs {
            let utxo = state
                .utxos
                .iter_mut()
                .find(|u| u.transaction_hash == input_ref.hash && u.output_index == input_ref.index)
                .ok_or_else(|| rejected("unknown input"))?;
            if !utxo.is_unspent() {
                return Err(rejected("input already spent"));
            }
            utxo.state = UtxoState::Spent;
        }

        Ok(TransactionRequest {
            request_id: input.request_id.clone(),
            transaction_hash: hex::encode(hash),
            views: Vec::new(),
            state: "spent".into(),
        })
    }
}
