use safemig_crypto::encode_private_key;
use safemig_migrator::{
    resolve_receiver, MigrationContext, MigrationError, Migrator, Phase, UtxoPager, PAGE_SIZE,
};
use safemig_nullables::{LedgerCall, LedgerOp, NullIdentity, NullKeySource, NullKeystoreStore, NullLedger};
use safemig_types::{AssetId, UserId};
use safemig_wallet_core::{Keystore, SpendGroupSize, MIGRATION_MEMO};
use uuid::Uuid;

fn wallet() -> UserId {
    UserId::from(Uuid::from_bytes([0xaa; 16]))
}

fn receiver() -> UserId {
    UserId::from(Uuid::from_bytes([0xbb; 16]))
}

fn asset(n: u8) -> AssetId {
    AssetId::from(Uuid::from_bytes([n; 16]))
}

fn legacy_keystore() -> Keystore {
    Keystore {
        client_id: wallet(),
        session_id: "6d2f2a31-5a8e-4b4a-9a2a-0f4b6ab2c0de".into(),
        private_key: "01".repeat(32),
        extra: serde_json::Map::new(),
        pin: "123456".into(),
        spend_key: None,
    }
}

/// A keystore whose PIN and spend key are already rotated.
fn migrated_keystore(ledger: &NullLedger) -> Keystore {
    let mut ks = legacy_keystore();
    ks.set_pin(&NullKeySource::nth(200).private);
    let spend = NullKeySource::nth(201);
    ks.set_spend_key(&spend.private);
    ledger.set_spend_key(spend.public);
    ks
}

fn context(limit: usize) -> MigrationContext {
    MigrationContext {
        wallet: wallet(),
        receiver: receiver(),
        spend_group: SpendGroupSize::new(limit).unwrap(),
    }
}

#[tokio::test]
async fn zero_legacy_balance_is_skipped() {
    let ledger = NullLedger::new()
        .with_legacy_balance(asset(1), "A", "0")
        .with_legacy_balance(asset(2), "B", "12.5");
    let keys = NullKeySource::new();
    let store = NullKeystoreStore::new();
    let mut ks = migrated_keystore(&ledger);

    let report = Migrator::new(&ledger, &keys, &store, context(256))
        .run(&mut ks)
        .await
        .unwrap();

    let transfers = ledger.transfers();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].asset_id, asset(2));
    assert_eq!(transfers[0].amount.to_string(), "12.5");
    assert_eq!(transfers[0].opponent_id, receiver());
    assert_eq!(transfers[0].memo, MIGRATION_MEMO);
    assert_eq!(
        Uuid::parse_str(&transfers[0].trace_id).unwrap().get_version_num(),
        4
    );
    assert_eq!(report.legacy_transfers.len(), 1);
    assert!(!report.pin_rotated && !report.safe_activated);
}

#[tokio::test]
async fn full_migration_from_legacy_wallet() {
    let ledger = NullLedger::new().with_legacy_balance(asset(3), "C", "1.5");
    for _ in 0..1001 {
        ledger.add_utxo(asset(1), "0.001");
    }
    let keys = NullKeySource::new();
    let store = NullKeystoreStore::new();
    let mut ks = legacy_keystore();

    let report = Migrator::new(&ledger, &keys, &store, context(256))
        .run(&mut ks)
        .await
        .unwrap();

    // Rotations hit the ledger and the keystore in order.
    assert!(report.pin_rotated && report.safe_activated);
    assert_eq!(keys.generated(), 2);
    assert_eq!(store.save_count(), 2);
    assert_eq!(ledger.pin_key(), Some(NullKeySource::nth(1).public));
    assert_eq!(ledger.spend_key(), Some(NullKeySource::nth(2).public));
    let saved = store.last_saved().unwrap();
    assert_eq!(saved.pin, encode_private_key(&NullKeySource::nth(1).private));
    assert_eq!(
        saved.spend_key,
        Some(encode_private_key(&NullKeySource::nth(2).private))
    );

    // 1001 outputs in groups of 256, settled in order.
    let drained = &report.safe_assets;
    assert_eq!(drained.len(), 1);
    let sizes: Vec<_> = drained[0].groups.iter().map(|g| g.inputs).collect();
    assert_eq!(sizes, vec![256, 256, 256, 233]);
    assert_eq!(drained[0].total.to_string(), "1.001");
    assert_eq!(ledger.submitted_requests().len(), 4);
    assert!(ledger.unspent().is_empty());

    // 1001 outputs at 500 per page: three full or partial pages plus the empty one.
    assert_eq!(PAGE_SIZE, 500);
    assert_eq!(ledger.list_calls(), 4);
}

#[tokio::test]
async fn rerun_after_completion_changes_nothing() {
    let ledger = NullLedger::new().with_legacy_balance(asset(3), "C", "2");
    for _ in 0..10 {
        ledger.add_utxo(asset(1), "1");
    }
    let keys = NullKeySource::new();
    let store = NullKeystoreStore::new();
    let mut ks = legacy_keystore();
    let migrator = Migrator::new(&ledger, &keys, &store, context(4));

    migrator.run(&mut ks).await.unwrap();
    ledger.clear_calls();

    let report = migrator.run(&mut ks).await.unwrap();
    assert!(report.is_noop());
    assert_eq!(keys.generated(), 2);
    assert_eq!(store.save_count(), 2);
    let mutating = ledger.calls().into_iter().filter(|c| {
        !matches!(c, LedgerCall::ReadAssets | LedgerCall::ListUtxos(_))
    });
    assert_eq!(mutating.count(), 0);
}

#[tokio::test]
async fn rotation_with_key_form_pin_is_noop() {
    let ledger = NullLedger::new();
    let keys = NullKeySource::new();
    let store = NullKeystoreStore::new();
    let mut ks = legacy_keystore();
    ks.set_pin(&NullKeySource::nth(50).private);

    let rotated = Migrator::new(&ledger, &keys, &store, context(256))
        .rotate_pin(&mut ks)
        .await
        .unwrap();
    assert!(!rotated);
    assert_eq!(keys.generated(), 0);
    assert_eq!(store.save_count(), 0);
    assert!(ledger.calls().is_empty());
}

#[tokio::test]
async fn valid_spend_key_skips_activation() {
    let ledger = NullLedger::new();
    let keys = NullKeySource::new();
    let store = NullKeystoreStore::new();
    let mut ks = migrated_keystore(&ledger);

    let activated = Migrator::new(&ledger, &keys, &store, context(256))
        .activate_safe(&mut ks)
        .await
        .unwrap();
    assert!(!activated);
    assert!(ledger.calls().is_empty());
    assert_eq!(store.save_count(), 0);
    assert_eq!(keys.generated(), 0);
}

#[tokio::test]
async fn persist_failure_reports_diverged_secret() {
    let ledger = NullLedger::new();
    let keys = NullKeySource::new();
    let store = NullKeystoreStore::new();
    store.fail_saves();
    let mut ks = legacy_keystore();

    let err = Migrator::new(&ledger, &keys, &store, context(256))
        .run(&mut ks)
        .await
        .unwrap_err();

    match &err {
        MigrationError::Persist { phase, .. } => assert_eq!(*phase, Phase::RotatePin),
        other => panic!("expected persist error, got {other}"),
    }
    assert!(err.to_string().contains("reconciled manually"));
    // The ledger already accepted the new key; the run stops before phase 3.
    assert_eq!(ledger.pin_key(), Some(NullKeySource::nth(1).public));
    assert!(!ledger
        .calls()
        .iter()
        .any(|c| matches!(c, LedgerCall::SafeMigrate(_))));
}

#[tokio::test]
async fn ledger_failure_aborts_before_later_phases() {
    let ledger = NullLedger::new().with_legacy_balance(asset(1), "A", "3");
    ledger.fail(LedgerOp::Transfer, 20117, "Insufficient balance.");
    let keys = NullKeySource::new();
    let store = NullKeystoreStore::new();
    let mut ks = legacy_keystore();

    let err = Migrator::new(&ledger, &keys, &store, context(256))
        .run(&mut ks)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MigrationError::Ledger {
            phase: Phase::DrainLegacy,
            ..
        }
    ));
    assert_eq!(keys.generated(), 0);
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn failed_submit_stops_remaining_groups() {
    let ledger = NullLedger::new();
    for _ in 0..6 {
        ledger.add_utxo(asset(1), "1");
    }
    let keys = NullKeySource::new();
    let store = NullKeystoreStore::new();
    let ks = migrated_keystore(&ledger);
    ledger.fail(LedgerOp::SubmitRequest, 500, "server error");

    let err = Migrator::new(&ledger, &keys, &store, context(2))
        .drain_safe(&ks)
        .await
        .unwrap_err();

    let submitted = ledger.submitted_requests();
    assert_eq!(submitted.len(), 1);
    match &err {
        MigrationError::SubmitRequest { request_id, .. } => assert_eq!(request_id, &submitted[0]),
        other => panic!("expected submit error, got {other}"),
    }
    assert_eq!(ledger.unspent().len(), 6);
}

#[tokio::test]
async fn assets_drain_in_ascending_id_order() {
    let ledger = NullLedger::new();
    ledger.add_utxo(asset(9), "1");
    ledger.add_utxo(asset(2), "2");
    ledger.add_utxo(asset(5), "3");
    ledger.add_utxo(asset(2), "4");
    let keys = NullKeySource::new();
    let store = NullKeystoreStore::new();
    let ks = migrated_keystore(&ledger);

    let drained = Migrator::new(&ledger, &keys, &store, context(256))
        .drain_safe(&ks)
        .await
        .unwrap();

    let order: Vec<_> = drained.iter().map(|d| d.asset_id).collect();
    assert_eq!(order, vec![asset(2), asset(5), asset(9)]);
    assert_eq!(drained[0].total.to_string(), "6");
    assert_eq!(drained[0].groups[0].amount.to_string(), "6");

    let reads: Vec<_> = ledger
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            LedgerCall::ReadSafeAsset(id) => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(reads, order);
}

#[tokio::test]
async fn outputs_without_spend_key_are_an_error() {
    let ledger = NullLedger::new();
    ledger.add_utxo(asset(1), "1");
    let keys = NullKeySource::new();
    let store = NullKeystoreStore::new();
    let mut ks = legacy_keystore();
    ks.spend_key = Some("not-a-key".into());

    let err = Migrator::new(&ledger, &keys, &store, context(256))
        .drain_safe(&ks)
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::InvalidSpendKey));
}

#[tokio::test]
async fn keystore_for_other_wallet_is_rejected() {
    let ledger = NullLedger::new();
    let keys = NullKeySource::new();
    let store = NullKeystoreStore::new();
    let mut ks = legacy_keystore();
    ks.client_id = receiver();

    let err = Migrator::new(&ledger, &keys, &store, context(256))
        .run(&mut ks)
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::Config(_)));
    assert!(ledger.calls().is_empty());
}

#[tokio::test]
async fn receiver_checks_run_before_any_mutation() {
    let bot = UserId::from(Uuid::from_bytes([0xcc; 16]));
    let identity = NullIdentity::new()
        .with_user(bot, 0, "Some Bot")
        .with_user(wallet(), 7000, "Me")
        .with_user(receiver(), 7001, "Bob");

    let err = resolve_receiver(&identity, &bot.to_string(), wallet()).await.unwrap_err();
    assert!(matches!(err, MigrationError::ReceiverNotMessengerUser(_)));

    let err = resolve_receiver(&identity, &wallet().to_string(), wallet()).await.unwrap_err();
    assert!(matches!(err, MigrationError::ReceiverIsSelf(_)));

    let unknown = UserId::from(Uuid::from_bytes([0xdd; 16]));
    let err = resolve_receiver(&identity, &unknown.to_string(), wallet()).await.unwrap_err();
    assert!(matches!(err, MigrationError::ReceiverLookup(_)));

    let profile = resolve_receiver(&identity, &receiver().to_string(), wallet()).await.unwrap();
    assert_eq!(profile.full_name, "Bob");
}

#[tokio::test]
async fn receiver_resolves_by_identity_number() {
    let identity = NullIdentity::new()
        .with_user(wallet(), 7000, "Me")
        .with_user(receiver(), 37160854, "Bob");

    let profile = resolve_receiver(&identity, "37160854", wallet()).await.unwrap();
    assert_eq!(profile.user_id, receiver());
    assert_eq!(identity.lookups(), vec!["37160854".to_string()]);

    let err = resolve_receiver(&identity, "7000", wallet()).await.unwrap_err();
    assert!(matches!(err, MigrationError::ReceiverIsSelf(_)));
}

#[tokio::test]
async fn outputs_arriving_between_pages_are_listed() {
    let ledger = NullLedger::new();
    for _ in 0..3 {
        ledger.add_utxo(asset(1), "1");
    }

    let mut pager = UtxoPager::with_page_size(&ledger, 2);
    let mut sequences: Vec<u64> = pager
        .next_page()
        .await
        .unwrap()
        .unwrap()
        .iter()
        .map(|u| u.sequence)
        .collect();
    for _ in 0..3 {
        ledger.add_utxo(asset(1), "1");
    }
    while let Some(page) = pager.next_page().await.unwrap() {
        sequences.extend(page.iter().map(|u| u.sequence));
    }

    assert_eq!(sequences, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(pager.requests(), 4);
}

#[tokio::test]
async fn sequence_at_upper_bound_stops_pagination() {
    let ledger = NullLedger::new();
    ledger.add_utxo_at(asset(1), "1", u64::MAX);

    let mut pager = UtxoPager::new(&ledger);
    let err = pager.next_page().await.unwrap_err();
    assert!(err.to_string().contains("cannot advance"));
    assert_eq!(ledger.list_calls(), 1);
}

#[tokio::test]
async fn rejected_request_creation_names_the_request() {
    let ledger = NullLedger::new();
    for _ in 0..4 {
        ledger.add_utxo(asset(1), "1");
    }
    let keys = NullKeySource::new();
    let store = NullKeystoreStore::new();
    let ks = migrated_keystore(&ledger);
    ledger.fail(LedgerOp::CreateRequest, 10002, "invalid raw transaction");

    let err = Migrator::new(&ledger, &keys, &store, context(2))
        .drain_safe(&ks)
        .await
        .unwrap_err();

    let created = ledger.created_requests();
    assert_eq!(created.len(), 1);
    match &err {
        MigrationError::CreateRequest { request_id, .. } => assert_eq!(request_id, &created[0]),
        other => panic!("expected create request error, got {other}"),
    }
    assert!(ledger.submitted_requests().is_empty());
    assert_eq!(ledger.unspent().len(), 4);
}

#[tokio::test]
async fn missing_views_fail_signing_without_submitting() {
    let ledger = NullLedger::new();
    for _ in 0..3 {
        ledger.add_utxo(asset(1), "1");
    }
    let keys = NullKeySource::new();
    let store = NullKeystoreStore::new();
    let ks = migrated_keystore(&ledger);
    ledger.withhold_views(1);

    let err = Migrator::new(&ledger, &keys, &store, context(256))
        .drain_safe(&ks)
        .await
        .unwrap_err();

    assert!(matches!(err, MigrationError::Sign { .. }));
    assert!(ledger.submitted_requests().is_empty());
    assert_eq!(ledger.unspent().len(), 3);
}

#[tokio::test]
async fn retried_group_reuses_its_request_id() {
    let ledger = NullLedger::new();
    for _ in 0..3 {
        ledger.add_utxo(asset(1), "1");
    }
    let keys = NullKeySource::new();
    let store = NullKeystoreStore::new();
    let ks = migrated_keystore(&ledger);
    let migrator = Migrator::new(&ledger, &keys, &store, context(256));

    ledger.fail(LedgerOp::SubmitRequest, 500, "server error");
    migrator.drain_safe(&ks).await.unwrap_err();
    let first = ledger.submitted_requests();

    ledger.clear_failures();
    ledger.clear_calls();
    let drained = migrator.drain_safe(&ks).await.unwrap();

    assert_eq!(ledger.submitted_requests(), first);
    assert_eq!(drained[0].groups[0].request_id, first[0]);
    assert!(ledger.unspent().is_empty());
}
