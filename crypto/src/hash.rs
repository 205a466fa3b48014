//! Blake2b hashing for transactions, SHA-256 for request digests.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use safemig_types::{SafeTransaction, TypesError};
use sha2::Sha256;

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[data])
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash of a transaction's signed payload. Signatures do not affect it.
pub fn hash_transaction(tx: &SafeTransaction) -> Result<[u8; 32], TypesError> {
    Ok(blake2b_256(&tx.payload_bytes()?))
}

/// Hex-encoded SHA-256, as used for API request digests.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
