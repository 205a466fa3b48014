//! Nullable identity lookup: canned profiles.

use async_trait::async_trait;
use safemig_types::UserId;
use safemig_wallet_core::{IdentityLookup, UserProfile, WalletError};
use std::sync::Mutex;

/// Resolves a profile by its wallet id or its identity number, like the
/// real lookup service.
pub struct NullIdentity {
    profiles: Mutex<Vec<UserProfile>>,
    lookups: Mutex<Vec<String>>,
}

impl NullIdentity {
    pub fn new() -> Self {
        Self {
            profiles: Mutex::new(Vec::new()),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn with_user(self, user_id: UserId, identity_number: u64, full_name: &str) -> Self {
        self.profiles.lock().unwrap().push(UserProfile {
            user_id,
            identity_number,
            full_name: full_name.to_string(),
        });
        self
    }

    /// Every id asked for, in order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl Default for NullIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityLookup for NullIdentity {
    async fn lookup(&self, id: &str) -> Result<UserProfile, WalletError> {
        self.lookups.lock().unwrap().push(id.to_string());
        let id = id.trim();
        self.profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| {
                p.user_id.to_string().eq_ignore_ascii_case(id)
                    || (p.identity_number != 0 && p.identity_number.to_string() == id)
            })
            .cloned()
            .ok_or_else(|| WalletError::Lookup(format!("user {id} not found")))
    }
}
