//! Cryptographic capability for safemig.
//!
//! - **Ed25519** (`ed25519-dalek`) for key generation and signatures
//! - **Blake2b** for transaction hashes
//! - **SHA-256** for API request digests
//! - Hex string encoding of keys as stored in keystores

pub mod error;
pub mod hash;
pub mod keys;
pub mod sign;

pub use error::CryptoError;
pub use hash::{blake2b_256, blake2b_256_multi, hash_transaction, sha256_hex};
pub use keys::{
    encode_private_key, encode_public_key, generate_keypair, is_private_key,
    keypair_from_private, keypair_from_seed, parse_private_key, public_from_private,
    ENCODED_KEY_LEN,
};
pub use sign::{sign_message, sign_transaction, verify_signature, verify_transaction};
