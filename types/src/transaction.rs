//! Safe transactions and transaction requests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::amount::Amount;
use crate::error::TypesError;
use crate::id::{AssetId, UserId};
use crate::keys::Signature;

/// Current transaction encoding version.
pub const TRANSACTION_VERSION: u8 = 5;

/// Maximum number of inputs a single transaction may reference.
pub const MAX_TRANSACTION_INPUTS: usize = 256;

/// Ownership of an output: `threshold` of `members` must sign to spend it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeAddress {
    pub members: Vec<UserId>,
    pub threshold: u8,
}

impl SafeAddress {
    /// An address owned by a single user (threshold 1).
    pub fn single(user: UserId) -> Self {
        Self {
            members: vec![user],
            threshold: 1,
        }
    }
}

/// A reference to a previously created output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub hash: String,
    pub index: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub receiver: SafeAddress,
    pub amount: Amount,
}

/// A safe transaction, unsigned until `signatures` has one entry per input.
///
/// Each signature entry maps signer index (position within the input's
/// member list) to that member's signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeTransaction {
    pub version: u8,
    pub asset_id: AssetId,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub memo: String,
    pub signatures: Vec<BTreeMap<u16, Signature>>,
}

/// The signed portion of a transaction (everything except signatures).
#[derive(Serialize)]
struct Payload<'a> {
    version: u8,
    asset_id: &'a AssetId,
    inputs: &'a [TransactionInput],
    outputs: &'a [TransactionOutput],
    memo: &'a str,
}

impl SafeTransaction {
    /// Canonical bytes covered by input signatures.
    pub fn payload_bytes(&self) -> Result<Vec<u8>, TypesError> {
        let payload = Payload {
            version: self.version,
            asset_id: &self.asset_id,
            inputs: &self.inputs,
            outputs: &self.outputs,
            memo: &self.memo,
        };
        bincode::serialize(&payload).map_err(|e| TypesError::Serialization(e.to_string()))
    }

    /// Hex-encoded raw transaction, signatures included.
    pub fn dump(&self) -> Result<String, TypesError> {
        let bytes =
            bincode::serialize(self).map_err(|e| TypesError::Serialization(e.to_string()))?;
        Ok(hex::encode(&bytes))
    }

    /// Decode a raw transaction produced by [`SafeTransaction::dump`].
    pub fn load(raw: &str) -> Result<Self, TypesError> {
        let bytes = hex::decode(raw).map_err(|e| TypesError::Serialization(e.to_string()))?;
        bincode::deserialize(&bytes).map_err(|e| TypesError::Serialization(e.to_string()))
    }

    pub fn is_signed(&self) -> bool {
        !self.inputs.is_empty() && self.signatures.len() == self.inputs.len()
    }

    pub fn total_output(&self) -> Option<Amount> {
        Amount::checked_sum(self.outputs.iter().map(|o| o.amount))
    }
}

/// Payload for creating or submitting a transaction request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequestInput {
    pub request_id: String,
    pub raw: String,
}

/// Ledger-side view of a transaction request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub request_id: String,
    #[serde(default)]
    pub transaction_hash: String,
    /// One hex-encoded 32-byte view per input, needed to sign that input.
    #[serde(default)]
    pub views: Vec<String>,
    #[serde(default)]
    pub state: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SafeTransaction {
        SafeTransaction {
            version: TRANSACTION_VERSION,
            asset_id: "c6d0c728-2624-429b-8e0d-d9d19b6592fa".parse().unwrap(),
            inputs: vec![TransactionInput {
                hash: "aa".repeat(32),
                index: 1,
            }],
            outputs: vec![TransactionOutput {
                receiver: SafeAddress::single(
                    "e8e8cd79-cd40-4796-8c54-3a13cfe50115".parse().unwrap(),
                ),
                amount: "1.5".parse().unwrap(),
            }],
            memo: "memo".to_string(),
            signatures: Vec::new(),
        }
    }

    #[test]
    fn dump_and_load_preserve_transaction() {
        let tx = sample();
        let raw = tx.dump().unwrap();
        assert_eq!(SafeTransaction::load(&raw).unwrap(), tx);
    }

    #[test]
    fn payload_excludes_signatures() {
        let mut tx = sample();
        let before = tx.payload_bytes().unwrap();
        tx.signatures.push(BTreeMap::from([(0u16, Signature([7u8; 64]))]));
        assert_eq!(tx.payload_bytes().unwrap(), before);
        assert_ne!(tx.dump().unwrap(), sample().dump().unwrap());
    }

    #[test]
    fn signed_requires_one_entry_per_input() {
        let mut tx = sample();
        assert!(!tx.is_signed());
        tx.signatures.push(BTreeMap::new());
        assert!(tx.is_signed());
    }

    #[test]
    fn load_rejects_garbage() {
        assert!(SafeTransaction::load("zz").is_err());
        assert!(SafeTransaction::load("abc").is_err());
    }
}
