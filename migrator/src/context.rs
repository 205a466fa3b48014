//! Per-run parameters and receiver validation.

use safemig_types::UserId;
use safemig_wallet_core::{IdentityLookup, SpendGroupSize, UserProfile};

use crate::error::MigrationError;

/// Everything a run needs besides its collaborators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigrationContext {
    /// Wallet being drained.
    pub wallet: UserId,
    /// User receiving every balance.
    pub receiver: UserId,
    pub spend_group: SpendGroupSize,
}

/// Reject receivers that are not messenger users or are the wallet itself.
pub fn validate_receiver(profile: &UserProfile, wallet: UserId) -> Result<(), MigrationError> {
    if !profile.is_messenger_user() {
        return Err(MigrationError::ReceiverNotMessengerUser(profile.user_id));
    }
    if profile.user_id == wallet {
        return Err(MigrationError::ReceiverIsSelf(profile.user_id));
    }
    Ok(())
}

/// Look up `receiver` (wallet id or identity number) and validate the
/// resulting profile against `wallet`.
pub async fn resolve_receiver(
    lookup: &dyn IdentityLookup,
    receiver: &str,
    wallet: UserId,
) -> Result<UserProfile, MigrationError> {
    let profile = lookup
        .lookup(receiver)
        .await
        .map_err(MigrationError::ReceiverLookup)?;
    validate_receiver(&profile, wallet)?;
    Ok(profile)
}
