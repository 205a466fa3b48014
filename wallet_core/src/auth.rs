//! Request authentication for the ledger API.
//!
//! Every request carries an EdDSA JWT signed with the session key. The token
//! binds the request by including `sig`, the hex SHA-256 of
//! `METHOD + URI + BODY`, so a captured token cannot be replayed against a
//! different endpoint or payload.
//!
//! Account-level actions additionally carry a proof of the authorization
//! secret ([`pin_proof`]).

use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use safemig_crypto::{parse_private_key, sha256_hex, sign_message};
use safemig_types::{PrivateKey, UserId};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::WalletError;
use crate::keystore::Keystore;

/// Lifetime of a request token.
const TOKEN_TTL_SECS: u64 = 600;

/// Current Unix time in seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Session credentials extracted from the keystore.
pub struct SessionAuth {
    client_id: UserId,
    session_id: String,
    key: PrivateKey,
}

impl SessionAuth {
    pub fn from_keystore(keystore: &Keystore) -> Result<Self, WalletError> {
        Ok(Self {
            client_id: keystore.client_id,
            session_id: keystore.session_id.clone(),
            key: decode_session_key(&keystore.private_key)?,
        })
    }

    pub fn client_id(&self) -> UserId {
        self.client_id
    }

    /// Sign a fresh token for one request.
    pub fn token(&self, method: &str, uri: &str, body: &[u8]) -> String {
        let jti = uuid::Uuid::new_v4().to_string();
        self.token_at(method, uri, body, unix_now(), &jti)
    }

    fn token_at(&self, method: &str, uri: &str, body: &[u8], iat: u64, jti: &str) -> String {
        let mut signed = Vec::with_capacity(method.len() + uri.len() + body.len());
        signed.extend_from_slice(method.as_bytes());
        signed.extend_from_slice(uri.as_bytes());
        signed.extend_from_slice(body);

        let header = serde_json::json!({ "alg": "EdDSA", "typ": "JWT" });
        let claims = serde_json::json!({
            "uid": self.client_id,
            "sid": self.session_id,
            "iat": iat,
            "exp": iat + TOKEN_TTL_SECS,
            "jti": jti,
            "sig": sha256_hex(&signed),
            "scp": "FULL",
        });

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header.to_string()),
            URL_SAFE_NO_PAD.encode(claims.to_string()),
        );
        let signature = sign_message(signing_input.as_bytes(), &self.key);
        format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature.as_bytes()))
    }
}

/// Decode a session key stored as hex or base64 (32-byte seed or 64-byte
/// seed+public key).
fn decode_session_key(encoded: &str) -> Result<PrivateKey, WalletError> {
    if let Ok(key) = parse_private_key(encoded) {
        return Ok(key);
    }
    let bytes = [URL_SAFE_NO_PAD, URL_SAFE, STANDARD]
        .iter()
        .find_map(|engine| engine.decode(encoded).ok())
        .ok_or_else(|| WalletError::InvalidSessionKey("neither hex nor base64".into()))?;
    match bytes.len() {
        32 | 64 => {
            let mut seed = [0u8; 32];
            seed.copy_from_slice(&bytes[..32]);
            Ok(PrivateKey(seed))
        }
        n => Err(WalletError::InvalidSessionKey(format!(
            "must be 32 or 64 bytes, got {n}"
        ))),
    }
}

/// Authorization-secret proof attached to account-level requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PinProof {
    pub pin: String,
    pub timestamp: u64,
}

/// Prove possession of the authorization secret for `purpose`.
///
/// A rotated (key-form) secret signs `TIP:{purpose}:{timestamp}` and never
/// leaves the process; a legacy secret can only be forwarded as-is.
pub fn pin_proof(pin: &str, purpose: &str, timestamp: u64) -> PinProof {
    let pin = match parse_private_key(pin) {
        Ok(key) => {
            let message = format!("TIP:{purpose}:{timestamp}");
            hex::encode(sign_message(message.as_bytes(), &key).as_bytes())
        }
        Err(_) => pin.to_string(),
    };
    PinProof { pin, timestamp }
}
