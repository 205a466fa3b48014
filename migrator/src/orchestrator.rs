//! Migration orchestrator: runs the four phases in order against one wallet.
//!
//! Each phase first checks whether its work is already done, so a run that
//! was interrupted can simply be started again:
//!
//! 1. **Drain legacy**: re-listed every run; zero balances are skipped.
//! 2. **Rotate PIN**: skipped when the keystore PIN already parses as a key.
//! 3. **Activate safe**: skipped when the keystore spend key parses as a key.
//! 4. **Drain safe**: outputs are re-enumerated from sequence 0 every run.
//!
//! The keystore is the only record of phases 2 and 3, so every rotation is
//! persisted before the next ledger call. The first failure aborts the run.

use safemig_crypto::encode_public_key;
use safemig_types::{sum_utxos, LegacyAsset};
use safemig_wallet_core::{
    group_by_asset, spend_groups, KeySource, Keystore, KeystoreStore, LedgerClient,
    TransferInput, WalletError, MIGRATION_MEMO,
};
use uuid::Uuid;

use crate::context::MigrationContext;
use crate::error::MigrationError;
use crate::phase::Phase;
use crate::pipeline::settle_group;
use crate::report::{LegacyTransfer, MigrationReport, SafeAssetDrain};
use crate::utxos::list_unspent;

pub struct Migrator<'a> {
    ledger: &'a dyn LedgerClient,
    keys: &'a dyn KeySource,
    store: &'a dyn KeystoreStore,
    context: MigrationContext,
}

impl<'a> Migrator<'a> {
    pub fn new(
        ledger: &'a dyn LedgerClient,
        keys: &'a dyn KeySource,
        store: &'a dyn KeystoreStore,
        context: MigrationContext,
    ) -> Self {
        Self {
            ledger,
            keys,
            store,
            context,
        }
    }

    pub fn context(&self) -> &MigrationContext {
        &self.context
    }

    /// Run every phase in order.
    pub async fn run(&self, keystore: &mut Keystore) -> Result<MigrationReport, MigrationError> {
        if keystore.client_id != self.context.wallet {
            return Err(MigrationError::Config(format!(
                "keystore belongs to {}, run is for {}",
                keystore.client_id, self.context.wallet
            )));
        }

        let legacy_transfers = self.drain_legacy(keystore).await?;
        let pin_rotated = self.rotate_pin(keystore).await?;
        let safe_activated = self.activate_safe(keystore).await?;
        let safe_assets = self.drain_safe(keystore).await?;

        Ok(MigrationReport {
            legacy_transfers,
            pin_rotated,
            safe_activated,
            safe_assets,
        })
    }

    /// Phase 1: transfer every non-zero legacy balance to the receiver.
    pub async fn drain_legacy(
        &self,
        keystore: &Keystore,
    ) -> Result<Vec<LegacyTransfer>, MigrationError> {
        let phase = Phase::DrainLegacy;
        let ledger_err = |source: WalletError| MigrationError::Ledger { phase, source };

        let mut assets: Vec<LegacyAsset> = self
            .ledger
            .read_assets()
            .await
            .map_err(ledger_err)?
            .into_iter()
            .filter(|a| !a.balance.is_zero())
            .collect();
        if assets.is_empty() {
            tracing::info!("no legacy balances");
            return Ok(Vec::new());
        }
        assets.sort_by_key(|a| a.asset_id);

        tracing::info!(assets = assets.len(), "{phase}: start");
        let mut transfers = Vec::with_capacity(assets.len());
        for asset in assets {
            tracing::info!(amount = %asset.balance, symbol = %asset.symbol, "migrating legacy balance");
            let input = TransferInput {
                asset_id: asset.asset_id,
                opponent_id: self.context.receiver,
                amount: asset.balance,
                trace_id: Uuid::new_v4().to_string(),
                memo: MIGRATION_MEMO.to_string(),
            };
            let snapshot = self
                .ledger
                .transfer(&input, &keystore.pin)
                .await
                .map_err(ledger_err)?;
            tracing::info!(
                amount = %asset.balance,
                symbol = %asset.symbol,
                snapshot = %snapshot.snapshot_id,
                "migrated legacy balance"
            );
            transfers.push(LegacyTransfer {
                asset_id: asset.asset_id,
                symbol: asset.symbol,
                amount: asset.balance,
                snapshot_id: snapshot.snapshot_id,
            });
        }
        tracing::info!("{phase}: done");
        Ok(transfers)
    }

    /// Phase 2: replace a legacy PIN with a generated key. Returns whether
    /// a rotation happened.
    pub async fn rotate_pin(&self, keystore: &mut Keystore) -> Result<bool, MigrationError> {
        let phase = Phase::RotatePin;
        if keystore.pin_key().is_some() {
            tracing::info!("{phase}: already rotated");
            return Ok(false);
        }

        tracing::info!("{phase}: start");
        let key = self
            .keys
            .generate()
            .map_err(|source| MigrationError::KeyGeneration { phase, source })?;
        tracing::info!(public_key = %encode_public_key(&key.public), "generated authorization key");

        self.ledger
            .modify_pin(&keystore.pin, &key.public)
            .await
            .map_err(|source| MigrationError::Ledger { phase, source })?;

        keystore.set_pin(&key.private);
        self.store
            .save(keystore)
            .map_err(|source| MigrationError::Persist {
                phase,
                secret: "authorization key",
                public_key: key.public.clone(),
                source,
            })?;
        tracing::info!("{phase}: done");
        Ok(true)
    }

    /// Phase 3: register a generated spend key. Returns whether activation
    /// happened.
    pub async fn activate_safe(&self, keystore: &mut Keystore) -> Result<bool, MigrationError> {
        let phase = Phase::ActivateSafe;
        if keystore.spend_private_key().is_some() {
            tracing::info!("{phase}: already active");
            return Ok(false);
        }

        tracing::info!("{phase}: start");
        let key = self
            .keys
            .generate()
            .map_err(|source| MigrationError::KeyGeneration { phase, source })?;
        tracing::info!(public_key = %encode_public_key(&key.public), "generated spend key");

        self.ledger
            .safe_migrate(&key.private, &keystore.pin)
            .await
            .map_err(|source| MigrationError::Ledger { phase, source })?;

        keystore.set_spend_key(&key.private);
        self.store
            .save(keystore)
            .map_err(|source| MigrationError::Persist {
                phase,
                secret: "spend key",
                public_key: key.public.clone(),
                source,
            })?;
        tracing::info!("{phase}: done");
        Ok(true)
    }

    /// Phase 4: spend every unspent output to the receiver, one transaction
    /// per spend group, assets in ascending id order.
    pub async fn drain_safe(
        &self,
        keystore: &Keystore,
    ) -> Result<Vec<SafeAssetDrain>, MigrationError> {
        let phase = Phase::DrainSafe;
        let ledger_err = |source: WalletError| MigrationError::Ledger { phase, source };

        let utxos = list_unspent(self.ledger).await.map_err(ledger_err)?;
        if utxos.is_empty() {
            tracing::info!("no safe outputs");
            return Ok(Vec::new());
        }

        let by_asset = group_by_asset(utxos);
        tracing::info!(assets = by_asset.len(), "{phase}: start");
        let spend_key = keystore
            .spend_private_key()
            .ok_or(MigrationError::InvalidSpendKey)?;

        let mut drained = Vec::with_capacity(by_asset.len());
        for (asset_id, outputs) in by_asset {
            let asset = self
                .ledger
                .read_safe_asset(&asset_id)
                .await
                .map_err(ledger_err)?;
            let total = sum_utxos(&outputs).ok_or(MigrationError::AmountOverflow(asset_id))?;
            tracing::info!(
                amount = %total,
                symbol = %asset.symbol,
                outputs = outputs.len(),
                "migrating safe asset"
            );

            let groups = spend_groups(&outputs, self.context.spend_group);
            let mut settled = Vec::with_capacity(groups.len());
            for (index, group) in groups.iter().enumerate() {
                let result =
                    settle_group(self.ledger, group, self.context.receiver, &spend_key).await?;
                tracing::info!(
                    group = index + 1,
                    of = groups.len(),
                    inputs = result.inputs,
                    request_id = %result.request_id,
                    "spend group submitted"
                );
                settled.push(result);
            }

            tracing::info!(amount = %total, symbol = %asset.symbol, "migrated safe asset");
            drained.push(SafeAssetDrain {
                asset_id,
                symbol: asset.symbol,
                total,
                groups: settled,
            });
        }
        tracing::info!("{phase}: done");
        Ok(drained)
    }
}
