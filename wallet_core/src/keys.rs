//! Key generation for rotated secrets.

use safemig_types::KeyPair;

use crate::error::WalletError;

/// Source of fresh key pairs for the PIN and spend key rotations.
pub trait KeySource: Send + Sync {
    fn generate(&self) -> Result<KeyPair, WalletError>;
}

/// Generates keys from the operating system's random source.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsKeySource;

impl KeySource for OsKeySource {
    fn generate(&self) -> Result<KeyPair, WalletError> {
        Ok(safemig_crypto::generate_keypair()?)
    }
}
