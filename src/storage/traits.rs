//! Credential store interface
//!
//! The auth core only needs a handful of lookups and two kinds of writes:
//! profile edits and secret edits. Implementations must apply each write to a
//! single identity atomically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::auth::password::PasswordDigest;
use crate::auth::user::{Identity, ResetGrant};
use crate::error::Result;

/// Fields required to create an identity
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub name: String,
    pub bio: String,
    pub email: String,
    pub mobile: String,
    pub password_hash: PasswordDigest,
}

/// What to do with the stored reset grant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResetChange {
    #[default]
    Keep,
    Set(ResetGrant),
    Clear,
}

/// Change to the secret fields of an identity.
///
/// A new password digest always clears any outstanding reset grant, whatever
/// `reset` says.
#[derive(Debug, Clone, Default)]
pub struct SecretPatch {
    pub password_hash: Option<PasswordDigest>,
    pub reset: ResetChange,
    /// Apply only if the stored reset grant still carries this hash
    pub expect_reset_hash: Option<String>,
    /// Apply only if the stored reset grant has not expired at this instant
    pub redeemed_at: Option<DateTime<Utc>>,
}

impl SecretPatch {
    pub fn password(digest: PasswordDigest) -> Self {
        Self {
            password_hash: Some(digest),
            ..Self::default()
        }
    }

    pub fn set_reset(grant: ResetGrant) -> Self {
        Self {
            reset: ResetChange::Set(grant),
            ..Self::default()
        }
    }

    /// New password guarded by the reset grant being redeemed at `now`
    pub fn redeem_reset(digest: PasswordDigest, token_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            password_hash: Some(digest),
            reset: ResetChange::Clear,
            expect_reset_hash: Some(token_hash),
            redeemed_at: Some(now),
        }
    }
}

/// Editable profile fields
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub bio: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.bio.is_none()
    }
}

/// Identity persistence used by the auth core
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up by normalized email, including secrets
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>>;

    /// Look up by id, optionally including secrets
    async fn find_by_id(&self, id: &str, include_secret: bool) -> Result<Option<Identity>>;

    /// Look up the identity holding a reset grant with this hash, including secrets
    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<Identity>>;

    /// Create a new identity. Fails with Conflict on duplicate email or mobile.
    async fn create(&self, fields: NewIdentity) -> Result<Identity>;

    /// Apply a change to the secret fields
    async fn update_secret_fields(&self, id: &str, patch: SecretPatch) -> Result<Identity>;

    /// Apply a change to the profile fields
    async fn update_profile(&self, id: &str, patch: ProfilePatch) -> Result<Identity>;

    /// All identities, secrets removed
    async fn list(&self) -> Result<Vec<Identity>>;
}
