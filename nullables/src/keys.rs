//! Nullable key source: deterministic key pairs with a call counter.

use safemig_crypto::keypair_from_seed;
use safemig_types::KeyPair;
use safemig_wallet_core::{KeySource, WalletError};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Generates key pairs from seeds `[1; 32]`, `[2; 32]`, ... in order.
pub struct NullKeySource {
    next_seed: AtomicU8,
    generated: AtomicUsize,
}

impl NullKeySource {
    pub fn new() -> Self {
        Self {
            next_seed: AtomicU8::new(1),
            generated: AtomicUsize::new(0),
        }
    }

    /// Number of key pairs handed out.
    pub fn generated(&self) -> usize {
        self.generated.load(Ordering::SeqCst)
    }

    /// The key pair the `n`th call (1-based) returns.
    pub fn nth(n: u8) -> KeyPair {
        keypair_from_seed(&[n; 32])
    }
}

impl Default for NullKeySource {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySource for NullKeySource {
    fn generate(&self) -> Result<KeyPair, WalletError> {
        self.generated.fetch_add(1, Ordering::SeqCst);
        let seed = self.next_seed.fetch_add(1, Ordering::SeqCst);
        Ok(keypair_from_seed(&[seed; 32]))
    }
}
