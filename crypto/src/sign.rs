//! Ed25519 message signing and safe transaction signing.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use safemig_types::{PrivateKey, PublicKey, SafeTransaction, Signature};
use std::collections::BTreeMap;

use crate::error::CryptoError;
use crate::hash::{blake2b_256_multi, hash_transaction};

/// Sign a message with a private key, returning the signature.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    let sig = signing_key.sign(message);
    Signature(sig.to_bytes())
}

/// Verify a signature against a message and public key.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify(message, &dalek_sig).is_ok()
}

/// Decode the ledger-issued views, one per transaction input.
fn decode_views(views: &[String], inputs: usize) -> Result<Vec<[u8; 32]>, CryptoError> {
    if views.len() != inputs {
        return Err(CryptoError::ViewCountMismatch {
            expected: inputs,
            got: views.len(),
        });
    }
    views
        .iter()
        .enumerate()
        .map(|(index, view)| {
            let mut bytes = [0u8; 32];
            hex::decode_to_slice(view, &mut bytes).map_err(|e| CryptoError::InvalidView {
                index,
                reason: e.to_string(),
            })?;
            Ok(bytes)
        })
        .collect()
}

/// The digest an input signature commits to: transaction hash bound to the input's view.
fn input_digest(tx_hash: &[u8; 32], view: &[u8; 32]) -> [u8; 32] {
    blake2b_256_multi(&[tx_hash, view])
}

/// Sign every input of `tx` with the spend key.
///
/// `signer_index` is the spend key's position in each input's member list;
/// a wallet under single-key custody is always member 0. Existing signatures
/// are replaced, so signing twice yields the same transaction.
pub fn sign_transaction(
    tx: &mut SafeTransaction,
    spend_key: &PrivateKey,
    views: &[String],
    signer_index: u16,
) -> Result<(), CryptoError> {
    if tx.inputs.is_empty() {
        return Err(CryptoError::EmptyTransaction);
    }
    let views = decode_views(views, tx.inputs.len())?;
    let tx_hash = hash_transaction(tx).map_err(|e| CryptoError::Encoding(e.to_string()))?;

    tx.signatures = views
        .iter()
        .map(|view| {
            let sig = sign_message(&input_digest(&tx_hash, view), spend_key);
            BTreeMap::from([(signer_index, sig)])
        })
        .collect();
    Ok(())
}

/// Check that every input carries a valid signature from `public_key` at `signer_index`.
pub fn verify_transaction(
    tx: &SafeTransaction,
    public_key: &PublicKey,
    views: &[String],
    signer_index: u16,
) -> bool {
    if !tx.is_signed() {
        return false;
    }
    let (Ok(views), Ok(tx_hash)) = (decode_views(views, tx.inputs.len()), hash_transaction(tx))
    else {
        return false;
    };
    tx.signatures.iter().zip(&views).all(|(sigs, view)| {
        sigs.get(&signer_index)
            .is_some_and(|sig| verify_signature(&input_digest(&tx_hash, view), sig, public_key))
    })
}
