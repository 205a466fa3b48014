//! Nullable keystore store: records saves in memory.

use safemig_wallet_core::{Keystore, KeystoreStore, WalletError};
use std::path::PathBuf;
use std::sync::Mutex;

/// A keystore store that keeps every saved record instead of writing a file.
pub struct NullKeystoreStore {
    saved: Mutex<Vec<Keystore>>,
    fail: Mutex<bool>,
}

impl NullKeystoreStore {
    pub fn new() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail: Mutex::new(false),
        }
    }

    /// Make every subsequent save fail as an unwritable file would.
    pub fn fail_saves(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    /// The most recently persisted record.
    pub fn last_saved(&self) -> Option<Keystore> {
        self.saved.lock().unwrap().last().cloned()
    }
}

impl Default for NullKeystoreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeystoreStore for NullKeystoreStore {
    fn save(&self, keystore: &Keystore) -> Result<(), WalletError> {
        if *self.fail.lock().unwrap() {
            return Err(WalletError::KeystoreWrite {
                path: PathBuf::from("/null/keystore.json"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.saved.lock().unwrap().push(keystore.clone());
        Ok(())
    }
}
