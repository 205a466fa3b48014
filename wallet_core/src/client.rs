//! HTTP implementation of [`LedgerClient`].
//!
//! Responses use a JSON envelope: `{"data": ...}` on success and
//! `{"error": {"code", "description"}}` on failure. Ledger-level failures map
//! to [`WalletError::Ledger`]; everything below that (connect, timeout,
//! non-JSON bodies) maps to [`WalletError::Transport`] or
//! [`WalletError::InvalidResponse`].

use async_trait::async_trait;
use reqwest::Method;
use safemig_crypto::{encode_public_key, public_from_private, sign_message};
use safemig_types::{
    AssetId, LegacyAsset, PrivateKey, PublicKey, SafeAsset, SafeUtxo, Snapshot,
    TransactionRequest, TransactionRequestInput,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::auth::{pin_proof, unix_now, PinProof, SessionAuth};
use crate::error::WalletError;
use crate::ledger::{LedgerClient, TransferInput, UtxoQuery};

/// Default ledger API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.mixin.one";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    code: i64,
    #[serde(default)]
    description: String,
}

#[derive(Serialize)]
struct TransferBody<'a> {
    #[serde(flatten)]
    input: &'a TransferInput,
    #[serde(flatten)]
    proof: PinProof,
}

#[derive(Serialize)]
struct PinUpdateBody {
    old_pin: String,
    timestamp: u64,
    /// New authorization public key, hex.
    pin: String,
}

#[derive(Serialize)]
struct SafeRegisterBody {
    public_key: String,
    /// Spend key signature over the client id, proving possession.
    signature: String,
    #[serde(flatten)]
    proof: PinProof,
}

/// Authenticated client for the ledger API.
pub struct HttpLedgerClient {
    http: reqwest::Client,
    base_url: String,
    auth: SessionAuth,
}

impl HttpLedgerClient {
    pub fn new(base_url: impl Into<String>, auth: SessionAuth) -> Result<Self, WalletError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| WalletError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send an authenticated request and unwrap the `data` field.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        uri: &str,
        body: Option<Vec<u8>>,
    ) -> Result<T, WalletError> {
        let payload = body.unwrap_or_default();
        let token = self.auth.token(method.as_str(), uri, &payload);
        debug!(%method, uri, "ledger request");

        let mut request = self
            .http
            .request(method, format!("{}{uri}", self.base_url))
            .bearer_auth(token);
        if !payload.is_empty() {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(payload);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        let envelope: Envelope<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(WalletError::Transport(format!("ledger returned HTTP {status}")))
            }
            Err(e) => return Err(WalletError::InvalidResponse(format!("{uri}: {e}"))),
        };
        if let Some(err) = envelope.error {
            return Err(WalletError::Ledger {
                code: err.code,
                description: err.description,
            });
        }
        envelope
            .data
            .ok_or_else(|| WalletError::InvalidResponse(format!("{uri}: missing data")))
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        uri: &str,
        body: &B,
    ) -> Result<T, WalletError> {
        let payload = serde_json::to_vec(body)
            .map_err(|e| WalletError::InvalidResponse(format!("encode {uri}: {e}")))?;
        self.call(Method::POST, uri, Some(payload)).await
    }

    async fn get<T: DeserializeOwned>(&self, uri: &str) -> Result<T, WalletError> {
        self.call(Method::GET, uri, None).await
    }

    /// Request endpoints answer with a list; a single input yields a single request.
    fn single_request(
        mut requests: Vec<TransactionRequest>,
        uri: &str,
    ) -> Result<TransactionRequest, WalletError> {
        match requests.len() {
            1 => Ok(requests.remove(0)),
            n => Err(WalletError::InvalidResponse(format!(
                "{uri}: expected 1 transaction request, got {n}"
            ))),
        }
    }
}

fn transport_error(e: reqwest::Error) -> WalletError {
    if e.is_timeout() {
        WalletError::Transport(format!("request timed out: {e}"))
    } else if e.is_connect() {
        WalletError::Transport(format!("connection failed: {e}"))
    } else {
        WalletError::Transport(e.to_string())
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn read_assets(&self) -> Result<Vec<LegacyAsset>, WalletError> {
        self.get("/assets").await
    }

    async fn transfer(&self, input: &TransferInput, pin: &str) -> Result<Snapshot, WalletError> {
        let purpose = format!("TRANSFER:{}", input.trace_id);
        let body = TransferBody {
            input,
            proof: pin_proof(pin, &purpose, unix_now()),
        };
        self.post("/transfers", &body).await
    }

    async fn modify_pin(
        &self,
        old_pin: &str,
        new_public_key: &PublicKey,
    ) -> Result<(), WalletError> {
        let proof = pin_proof(old_pin, "PIN:UPDATE", unix_now());
        let body = PinUpdateBody {
            old_pin: proof.pin,
            timestamp: proof.timestamp,
            pin: encode_public_key(new_public_key),
        };
        let _: serde_json::Value = self.post("/pin/update", &body).await?;
        Ok(())
    }

    async fn safe_migrate(&self, spend_key: &PrivateKey, pin: &str) -> Result<(), WalletError> {
        let client_id = self.auth.client_id().to_string();
        let body = SafeRegisterBody {
            public_key: encode_public_key(&public_from_private(spend_key)),
            signature: hex::encode(sign_message(client_id.as_bytes(), spend_key).as_bytes()),
            proof: pin_proof(pin, "SAFE:MIGRATE", unix_now()),
        };
        let _: serde_json::Value = self.post("/safe/users", &body).await?;
        Ok(())
    }

    async fn list_utxos(&self, query: &UtxoQuery) -> Result<Vec<SafeUtxo>, WalletError> {
        let uri = format!(
            "/safe/outputs?state={}&offset={}&limit={}&order={}",
            query.state, query.offset, query.limit, query.order
        );
        self.get(&uri).await
    }

    async fn read_safe_asset(&self, asset_id: &AssetId) -> Result<SafeAsset, WalletError> {
        self.get(&format!("/safe/assets/{asset_id}")).await
    }

    async fn create_transaction_request(
        &self,
        input: &TransactionRequestInput,
    ) -> Result<TransactionRequest, WalletError> {
        let uri = "/safe/transaction/requests";
        let requests = self.post(uri, std::slice::from_ref(input)).await?;
        Self::single_request(requests, uri)
    }

    async fn submit_transaction_request(
        &self,
        input: &TransactionRequestInput,
    ) -> Result<TransactionRequest, WalletError> {
        let uri = "/safe/transactions";
        let requests = self.post(uri, std::slice::from_ref(input)).await?;
        Self::single_request(requests, uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_error_parses() {
        let env: Envelope<serde_json::Value> = serde_json::from_str(
            r#"{"error":{"status":202,"code":20117,"description":"Insufficient balance."}}"#,
        )
        .unwrap();
        let err = env.error.unwrap();
        assert_eq!(err.code, 20117);
        assert_eq!(err.description, "Insufficient balance.");
        assert!(env.data.is_none());
    }

    #[test]
    fn envelope_data_parses_utxos() {
        let env: Envelope<Vec<SafeUtxo>> = serde_json::from_str(
            r#"{"data":[{
                "output_id":"o1","transaction_hash":"ab","output_index":0,
                "asset_id":"c6d0c728-2624-429b-8e0d-d9d19b6592fa",
                "amount":"0.5","sequence":7,"state":"unspent"
            }]}"#,
        )
        .unwrap();
        let utxos = env.data.unwrap();
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos[0].sequence, 7);
    }

    #[test]
    fn single_request_rejects_unexpected_count() {
        let err = HttpLedgerClient::single_request(Vec::new(), "/safe/transactions").unwrap_err();
        assert!(matches!(err, WalletError::InvalidResponse(_)));
    }

    #[test]
    fn transfer_body_flattens_proof() {
        let input = TransferInput {
            asset_id: "c6d0c728-2624-429b-8e0d-d9d19b6592fa".parse().unwrap(),
            opponent_id: "e8e8cd79-cd40-4796-8c54-3a13cfe50115".parse().unwrap(),
            amount: "12.5".parse().unwrap(),
            trace_id: "t-1".into(),
            memo: "m".into(),
        };
        let body = TransferBody {
            input: &input,
            proof: pin_proof("123456", "TRANSFER:t-1", 5),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["amount"], "12.5");
        assert_eq!(json["pin"], "123456");
        assert_eq!(json["timestamp"], 5);
    }
}
