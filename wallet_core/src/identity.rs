//! Public identity lookup for the receiver.
//!
//! Sends `GET {base}/users/{id}`, where `id` is either a wallet id or a
//! numeric identity number, and reads `{"data": {"user_id",
//! "identity_number", "full_name"}}`. The lookup service is unauthenticated
//! and separate from the ledger API.

use async_trait::async_trait;
use safemig_types::UserId;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

use crate::error::WalletError;

/// Default identity lookup endpoint.
pub const DEFAULT_LOOKUP_BASE: &str = "https://echo.yiplee.com";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A user's public profile.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    /// Zero for identities that are not messenger users (bots, apps).
    #[serde(default, deserialize_with = "lenient_number")]
    pub identity_number: u64,
    #[serde(default)]
    pub full_name: String,
}

impl UserProfile {
    pub fn is_messenger_user(&self) -> bool {
        self.identity_number != 0
    }
}

/// Accept the identity number as a JSON string or number; anything
/// unparsable reads as zero.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
        Other(serde_json::Value),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(s) => s.trim().parse().unwrap_or(0),
        Raw::Other(_) => 0,
    })
}

#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// Look up a user by wallet id or identity number.
    async fn lookup(&self, id: &str) -> Result<UserProfile, WalletError>;
}

#[derive(Deserialize)]
struct LookupResponse {
    data: Option<UserProfile>,
}

/// HTTP client for the identity lookup service.
pub struct IdentityClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for IdentityClient {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_BASE)
    }
}

#[async_trait]
impl IdentityLookup for IdentityClient {
    async fn lookup(&self, id: &str) -> Result<UserProfile, WalletError> {
        let id = id.trim();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(WalletError::Lookup(format!("invalid user id {id:?}")));
        }
        let url = format!("{}/users/{id}", self.base_url);

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                WalletError::Lookup(format!("request timed out: {e}"))
            } else if e.is_connect() {
                WalletError::Lookup(format!("connection failed: {e}"))
            } else {
                WalletError::Lookup(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(WalletError::Lookup(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| WalletError::Lookup(format!("failed to parse profile: {e}")))?;
        body.data
            .ok_or_else(|| WalletError::Lookup(format!("user {id} not found")))
    }
}
