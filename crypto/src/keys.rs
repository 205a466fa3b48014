//! Ed25519 key generation and the string encoding stored in keystores.
//!
//! A private key is stored as 64 lowercase hex characters (the 32-byte seed).
//! Whether a keystore secret parses in this form is how the migrator tells a
//! rotated secret from a legacy one.

use ed25519_dalek::SigningKey;
use safemig_types::{KeyPair, PrivateKey, PublicKey};
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Length of an encoded private key in hex characters.
pub const ENCODED_KEY_LEN: usize = 64;

/// Generate a new Ed25519 key pair from the operating system's random source.
pub fn generate_keypair() -> Result<KeyPair, CryptoError> {
    let mut seed = [0u8; 32];
    getrandom::getrandom(&mut seed).map_err(|e| CryptoError::Random(e.to_string()))?;
    let keypair = keypair_from_seed(&seed);
    seed.zeroize();
    Ok(keypair)
}

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    let signing_key = SigningKey::from_bytes(&private.0);
    PublicKey(signing_key.verifying_key().to_bytes())
}

/// Reconstruct a full key pair from a private key.
pub fn keypair_from_private(private: PrivateKey) -> KeyPair {
    let public = public_from_private(&private);
    KeyPair { public, private }
}

/// Derive a key pair from a 32-byte seed (deterministic).
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    keypair_from_private(PrivateKey(*seed))
}

/// Parse a keystore secret as an encoded private key.
pub fn parse_private_key(encoded: &str) -> Result<PrivateKey, CryptoError> {
    if encoded.len() != ENCODED_KEY_LEN {
        return Err(CryptoError::InvalidKey(format!(
            "expected {ENCODED_KEY_LEN} hex characters, got {}",
            encoded.len()
        )));
    }
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(encoded, &mut bytes)
        .map_err(|e| CryptoError::InvalidKey(format!("invalid hex: {e}")))?;
    Ok(PrivateKey(bytes))
}

/// Whether a keystore secret is already in private-key form.
pub fn is_private_key(encoded: &str) -> bool {
    parse_private_key(encoded).is_ok()
}

/// Encode a private key for storage in the keystore.
pub fn encode_private_key(private: &PrivateKey) -> String {
    hex::encode(private.as_bytes())
}

/// Encode a public key for submission to the ledger.
pub fn encode_public_key(public: &PublicKey) -> String {
    hex::encode(public.as_bytes())
}
