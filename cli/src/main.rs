//! safemig: move a custodial wallet to safe custody and drain it to a receiver.

mod cli;
mod config;
mod prompt;
mod shutdown;

use anyhow::{bail, Context};
use clap::Parser;
use safemig_migrator::{resolve_receiver, MigrationContext, MigrationReport, Migrator};
use safemig_utils::{format_duration, init_logging};
use safemig_wallet_core::{
    FileKeystore, HttpLedgerClient, IdentityClient, OsKeySource, SessionAuth,
};
use std::time::Instant;

use crate::cli::Cli;
use crate::config::{MigrateConfig, ValidConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => MigrateConfig::from_toml_file(path)?,
        None => MigrateConfig::default(),
    };
    let config = cli.apply(base).validate()?;
    init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("loaded config from {}", path.display());
    }

    if let Err(e) = run(&cli, config).await {
        tracing::error!("migration failed: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: &Cli, config: ValidConfig) -> anyhow::Result<()> {
    let store = FileKeystore::new(&config.keystore);
    let mut keystore = store.load().context("load keystore")?;
    let auth = SessionAuth::from_keystore(&keystore).context("read session credentials")?;
    let ledger = HttpLedgerClient::new(&config.api_base, auth)?;
    let identity = IdentityClient::new(&config.lookup_base);

    let receiver = resolve_receiver(&identity, &cli.receiver, keystore.client_id).await?;
    tracing::info!(
        "migrate assets to {}({})",
        receiver.full_name,
        receiver.user_id
    );

    let label = format!("Continue migrating to {}", receiver.full_name);
    let confirmed = tokio::task::spawn_blocking(move || prompt::confirm_stdin(&label))
        .await
        .context("confirmation prompt")??;
    if !confirmed {
        tracing::info!("aborted, nothing changed");
        return Ok(());
    }

    let context = MigrationContext {
        wallet: keystore.client_id,
        receiver: receiver.user_id,
        spend_group: config.spend_group,
    };
    let keys = OsKeySource;
    let migrator = Migrator::new(&ledger, &keys, &store, context);

    let started = Instant::now();
    let report = tokio::select! {
        result = migrator.run(&mut keystore) => result?,
        signal = shutdown::wait_for_signal() => {
            let signal = signal.context("install signal handlers")?;
            bail!("interrupted by {signal}; run again to resume");
        }
    };
    log_summary(&report, started.elapsed());
    Ok(())
}

fn log_summary(report: &MigrationReport, elapsed: std::time::Duration) {
    if report.is_noop() {
        tracing::info!("nothing left to migrate");
        return;
    }
    for transfer in &report.legacy_transfers {
        tracing::info!(
            snapshot = %transfer.snapshot_id,
            "legacy: {} {}",
            transfer.amount,
            transfer.symbol
        );
    }
    for asset in &report.safe_assets {
        tracing::info!(
            groups = asset.groups.len(),
            "safe: {} {}",
            asset.total,
            asset.symbol
        );
    }
    tracing::info!(
        legacy_transfers = report.legacy_transfers.len(),
        pin_rotated = report.pin_rotated,
        safe_activated = report.safe_activated,
        groups = report.groups_settled(),
        outputs = report.outputs_spent(),
        "migration finished in {}",
        format_duration(elapsed)
    );
}
