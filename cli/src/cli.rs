//! Command-line interface.

use clap::Parser;
use std::path::PathBuf;

use crate::config::MigrateConfig;

#[derive(Debug, Parser)]
#[command(
    name = "safemig",
    version,
    about = "Migrate a custodial wallet's holdings to safe custody and drain them to a receiver"
)]
pub struct Cli {
    /// Receiver of every balance: a user id or an identity number.
    pub receiver: String,

    /// Path of the wallet keystore JSON file.
    #[arg(long = "key", env = "SAFEMIG_KEYSTORE")]
    pub keystore: Option<PathBuf>,

    /// Maximum outputs spent per transaction (1-256, default 256).
    #[arg(long, env = "SAFEMIG_SPEND_GROUP")]
    pub group: Option<usize>,

    /// Ledger API base URL.
    #[arg(long, env = "SAFEMIG_API_BASE")]
    pub api_base: Option<String>,

    /// Identity lookup base URL.
    #[arg(long, env = "SAFEMIG_LOOKUP_BASE")]
    pub lookup_base: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "SAFEMIG_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "SAFEMIG_LOG_FORMAT")]
    pub log_format: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Layer flags and environment over `base`.
    pub fn apply(&self, mut base: MigrateConfig) -> MigrateConfig {
        if let Some(path) = &self.keystore {
            base.keystore = Some(path.clone());
        }
        if let Some(group) = self.group {
            base.spend_group = group;
        }
        if let Some(url) = &self.api_base {
            base.api_base = url.clone();
        }
        if let Some(url) = &self.lookup_base {
            base.lookup_base = url.clone();
        }
        if let Some(level) = &self.log_level {
            base.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            base.log_format = format.clone();
        }
        base
    }
}
