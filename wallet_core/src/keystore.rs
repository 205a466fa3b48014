//! Wallet keystore: session credentials plus the two rotating secrets.
//!
//! The keystore is a JSON file holding the wallet's session credentials, the
//! authorization secret (`pin`) and, once safe custody is active, the spend
//! key. Whether each secret already parses as a private key is the only record
//! of which migration phases have completed, so the file must be rewritten
//! immediately after every rotation.
//!
//! Fields this crate does not know about are carried through untouched.

use safemig_crypto::{encode_private_key, parse_private_key};
use safemig_types::{PrivateKey, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::WalletError;

/// The on-disk credential record.
#[derive(Clone, Serialize, Deserialize)]
pub struct Keystore {
    pub client_id: UserId,
    pub session_id: String,
    /// Session signing key used to authenticate API requests.
    pub private_key: String,
    /// Other session fields (`pin_token`, `scope`, ...), preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// Authorization secret: a legacy PIN until rotated, then an encoded private key.
    pub pin: String,
    /// Spend key, absent until safe custody is activated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spend_key: Option<String>,
}

impl Keystore {
    /// The authorization secret as a private key, if it has been rotated.
    pub fn pin_key(&self) -> Option<PrivateKey> {
        parse_private_key(&self.pin).ok()
    }

    /// The spend key, if safe custody has been activated.
    pub fn spend_private_key(&self) -> Option<PrivateKey> {
        self.spend_key
            .as_deref()
            .and_then(|key| parse_private_key(key).ok())
    }

    pub fn set_pin(&mut self, key: &PrivateKey) {
        self.pin = encode_private_key(key);
    }

    pub fn set_spend_key(&mut self, key: &PrivateKey) {
        self.spend_key = Some(encode_private_key(key));
    }
}

impl fmt::Debug for Keystore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keystore")
            .field("client_id", &self.client_id)
            .field("session_id", &self.session_id)
            .field("pin_rotated", &self.pin_key().is_some())
            .field("spend_key_set", &self.spend_private_key().is_some())
            .finish_non_exhaustive()
    }
}

/// Persistence seam for the keystore record.
pub trait KeystoreStore: Send + Sync {
    /// Durably replace the stored record with `keystore`.
    fn save(&self, keystore: &Keystore) -> Result<(), WalletError>;
}

/// A keystore backed by a JSON file that already exists on disk.
#[derive(Clone, Debug)]
pub struct FileKeystore {
    path: PathBuf,
}

impl FileKeystore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Keystore, WalletError> {
        load_keystore(&self.path)
    }
}

impl KeystoreStore for FileKeystore {
    fn save(&self, keystore: &Keystore) -> Result<(), WalletError> {
        save_keystore(keystore, &self.path)
    }
}

/// Load a keystore from a JSON file.
pub fn load_keystore(path: &Path) -> Result<Keystore, WalletError> {
    let json = std::fs::read_to_string(path).map_err(|source| WalletError::KeystoreRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(WalletError::KeystoreParse)
}

/// Overwrite an existing keystore file in place and flush it to disk.
///
/// The file is opened without `create`, so its permission bits stay as the
/// operator set them and a missing file is an error rather than a new
/// world-readable one.
pub fn save_keystore(keystore: &Keystore, path: &Path) -> Result<(), WalletError> {
    let mut json = serde_json::to_vec_pretty(keystore).map_err(WalletError::KeystoreSerialize)?;
    json.push(b'\n');

    let write_err = |source: std::io::Error| WalletError::KeystoreWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(write_err)?;
    file.write_all(&json).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use safemig_crypto::keypair_from_seed;
    use std::fs;

    const LEGACY: &str = r#"{
  "client_id": "e8e8cd79-cd40-4796-8c54-3a13cfe50115",
  "session_id": "6d2f2a31-5a8e-4b4a-9a2a-0f4b6ab2c0de",
  "private_key": "0101010101010101010101010101010101010101010101010101010101010101",
  "pin_token": "b0pjBUKI0Vp9K+NspaL9mLh+pGQcb8yt",
  "scope": "FULL",
  "pin": "123456"
}"#;

    fn write_temp(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keystore.json");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn legacy_keystore_has_no_rotated_secrets() {
        let (_dir, path) = write_temp(LEGACY);
        let ks = load_keystore(&path).unwrap();
        assert_eq!(ks.pin, "123456");
        assert!(ks.pin_key().is_none());
        assert!(ks.spend_key.is_none());
        assert!(ks.spend_private_key().is_none());
    }

    #[test]
    fn save_preserves_unknown_fields_and_records_rotation() {
        let (_dir, path) = write_temp(LEGACY);
        let mut ks = load_keystore(&path).unwrap();
        let pin = keypair_from_seed(&[3u8; 32]);
        let spend = keypair_from_seed(&[4u8; 32]);
        ks.set_pin(&pin.private);
        ks.set_spend_key(&spend.private);
        save_keystore(&ks, &path).unwrap();

        let reloaded = load_keystore(&path).unwrap();
        assert_eq!(reloaded.pin_key().unwrap().0, pin.private.0);
        assert_eq!(reloaded.spend_private_key().unwrap().0, spend.private.0);
        assert_eq!(reloaded.extra["pin_token"], "b0pjBUKI0Vp9K+NspaL9mLh+pGQcb8yt");
        assert_eq!(reloaded.extra["scope"], "FULL");
    }

    #[test]
    fn spend_key_omitted_until_set() {
        let (_dir, path) = write_temp(LEGACY);
        let ks = load_keystore(&path).unwrap();
        save_keystore(&ks, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("spend_key"));
        assert!(text.contains("\n  \"pin\": \"123456\""));
    }

    #[test]
    fn shorter_rewrite_leaves_no_trailing_bytes() {
        let padded = format!("{LEGACY}\n{}", " ".repeat(4096));
        let (_dir, path) = write_temp(&padded);
        let ks = load_keystore(&path).unwrap();
        save_keystore(&ks, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.len() < padded.len());
        assert!(load_keystore(&path).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn save_preserves_permission_bits() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, path) = write_temp(LEGACY);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
        let ks = load_keystore(&path).unwrap();
        save_keystore(&ks, &path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn save_to_missing_file_fails() {
        let (_dir, path) = write_temp(LEGACY);
        let ks = load_keystore(&path).unwrap();
        let missing = path.with_file_name("missing.json");
        let err = save_keystore(&ks, &missing).unwrap_err();
        assert!(matches!(err, WalletError::KeystoreWrite { .. }));
        assert!(!missing.exists());
    }

    #[test]
    fn load_errors_are_distinct() {
        let missing = load_keystore(Path::new("/nonexistent/safemig/keystore.json"));
        assert!(matches!(missing, Err(WalletError::KeystoreRead { .. })));

        let (_dir, path) = write_temp("{ not json");
        assert!(matches!(
            load_keystore(&path),
            Err(WalletError::KeystoreParse(_))
        ));
    }

    #[test]
    fn debug_does_not_leak_secrets() {
        let (_dir, path) = write_temp(LEGACY);
        let ks = load_keystore(&path).unwrap();
        let shown = format!("{ks:?}");
        assert!(!shown.contains("123456"));
        assert!(!shown.contains("0101010101"));
    }

    #[test]
    fn file_keystore_round_trips_through_trait() {
        let (_dir, path) = write_temp(LEGACY);
        let store = FileKeystore::new(&path);
        let mut ks = store.load().unwrap();
        ks.set_pin(&keypair_from_seed(&[8u8; 32]).private);
        store.save(&ks).unwrap();
        assert!(store.load().unwrap().pin_key().is_some());
    }
}
