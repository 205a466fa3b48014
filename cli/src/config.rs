//! Run configuration with TOML file support.

use safemig_utils::LogFormat;
use safemig_wallet_core::{SpendGroupSize, DEFAULT_API_BASE, DEFAULT_LOOKUP_BASE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("keystore path is required (--key or SAFEMIG_KEYSTORE)")]
    MissingKeystore,

    #[error("invalid spend group count {0}: must be between 1 and 256")]
    SpendGroup(usize),

    #[error("{0}")]
    LogFormat(String),
}

/// Settings for one migration run.
///
/// Loaded from a TOML file via [`MigrateConfig::from_toml_file`], then
/// overridden by command-line flags and environment variables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrateConfig {
    /// Path of the wallet keystore JSON file.
    #[serde(default)]
    pub keystore: Option<PathBuf>,

    /// Maximum outputs spent per transaction.
    #[serde(default = "default_spend_group")]
    pub spend_group: usize,

    /// Ledger API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Identity lookup base URL.
    #[serde(default = "default_lookup_base")]
    pub lookup_base: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_spend_group() -> usize {
    SpendGroupSize::MAX.get()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_lookup_base() -> String {
    DEFAULT_LOOKUP_BASE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            keystore: None,
            spend_group: default_spend_group(),
            api_base: default_api_base(),
            lookup_base: default_lookup_base(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// A configuration that passed [`MigrateConfig::validate`].
#[derive(Clone, Debug)]
pub struct ValidConfig {
    pub keystore: PathBuf,
    pub spend_group: SpendGroupSize,
    pub api_base: String,
    pub lookup_base: String,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl MigrateConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Check every setting before any network action is taken.
    pub fn validate(self) -> Result<ValidConfig, ConfigError> {
        let keystore = self.keystore.ok_or(ConfigError::MissingKeystore)?;
        let spend_group = SpendGroupSize::new(self.spend_group)
            .map_err(|_| ConfigError::SpendGroup(self.spend_group))?;
        let log_format = self
            .log_format
            .parse::<LogFormat>()
            .map_err(ConfigError::LogFormat)?;
        Ok(ValidConfig {
            keystore,
            spend_group,
            api_base: self.api_base,
            lookup_base: self.lookup_base,
            log_level: self.log_level,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = MigrateConfig::from_toml_str("").unwrap();
        assert_eq!(config, MigrateConfig::default());
        assert_eq!(config.spend_group, 256);
        assert_eq!(config.api_base, "https://api.mixin.one");
    }

    #[test]
    fn partial_toml_overrides() {
        let config = MigrateConfig::from_toml_str(
            r#"
            keystore = "/etc/safemig/keystore.json"
            spend_group = 64
            log_format = "json"
            "#,
        )
        .unwrap();
        let valid = config.validate().unwrap();
        assert_eq!(valid.spend_group.get(), 64);
        assert_eq!(valid.log_format, LogFormat::Json);
        assert_eq!(valid.lookup_base, "https://echo.yiplee.com");
    }

    #[test]
    fn out_of_range_group_is_rejected() {
        for bad in [0, 257] {
            let config = MigrateConfig {
                keystore: Some("k.json".into()),
                spend_group: bad,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::SpendGroup(n)) if n == bad));
        }
    }

    #[test]
    fn missing_keystore_is_rejected() {
        assert!(matches!(
            MigrateConfig::default().validate(),
            Err(ConfigError::MissingKeystore)
        ));
    }

    #[test]
    fn missing_file_returns_read_error() {
        let result = MigrateConfig::from_toml_file(Path::new("/nonexistent/safemig.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("safemig.toml");
        std::fs::write(&path, "keystore = \"wallet.json\"\nspend_group = 8\n").unwrap();
        let config = MigrateConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.keystore, Some(PathBuf::from("wallet.json")));
        assert_eq!(config.spend_group, 8);
    }

    #[test]
    fn non_numeric_group_is_parse_error() {
        assert!(matches!(
            MigrateConfig::from_toml_str("spend_group = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
