//! In-memory credential store for development and testing
//!
//! Identities live in a map keyed by id with secondary indexes for email and
//! mobile. Every write takes the single write lock, which is what makes each
//! update atomic.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::traits::*;
use crate::auth::user::{normalize_email, Identity, Role};
use crate::error::{AuthError, Result};

#[derive(Default)]
struct Tables {
    identities: HashMap<String, Identity>,
    by_email: HashMap<String, String>,  // email -> id
    by_mobile: HashMap<String, String>, // mobile -> id
}

/// In-memory identity storage
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the role of an identity (used to seed administrators)
    pub async fn set_role(&self, id: &str, role: Role) -> Result<Identity> {
        let mut tables = self.tables.write().await;
        let identity = tables
            .identities
            .get_mut(id)
            .ok_or_else(|| AuthError::NotFound(format!("Identity {} not found", id)))?;
        identity.role = role;
        identity.updated_at = Utc::now();
        Ok(identity.without_secrets())
    }

    pub async fn count(&self) -> usize {
        self.tables.read().await.identities.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_email
            .get(&normalize_email(email))
            .and_then(|id| tables.identities.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: &str, include_secret: bool) -> Result<Option<Identity>> {
        let tables = self.tables.read().await;
        Ok(tables.identities.get(id).map(|identity| {
            if include_secret {
                identity.clone()
            } else {
                identity.without_secrets()
            }
        }))
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<Identity>> {
        let tables = self.tables.read().await;
        Ok(tables
            .identities
            .values()
            .find(|identity| {
                identity
                    .reset
                    .as_ref()
                    .map_or(false, |grant| grant.token_hash == token_hash)
            })
            .cloned())
    }

    async fn create(&self, fields: NewIdentity) -> Result<Identity> {
        let email = normalize_email(&fields.email);
        let mobile = fields.mobile.trim().to_string();

        let mut tables = self.tables.write().await;
        if tables.by_email.contains_key(&email) {
            return Err(AuthError::Conflict("Email-ID is already exist.".to_string()));
        }
        if tables.by_mobile.contains_key(&mobile) {
            return Err(AuthError::Conflict("Mobile number is already exist.".to_string()));
        }

        let now = Utc::now();
        let identity = Identity {
            id: Uuid::new_v4().to_string(),
            name: fields.name,
            bio: fields.bio,
            email: email.clone(),
            mobile: mobile.clone(),
            role: Role::default(),
            password_hash: Some(fields.password_hash),
            reset: None,
            created_at: now,
            updated_at: now,
        };

        tables.by_email.insert(email, identity.id.clone());
        tables.by_mobile.insert(mobile, identity.id.clone());
        tables.identities.insert(identity.id.clone(), identity.clone());

        Ok(identity.without_secrets())
    }

    async fn update_secret_fields(&self, id: &str, patch: SecretPatch) -> Result<Identity> {
        let mut tables = self.tables.write().await;
        let identity = tables
            .identities
            .get_mut(id)
            .ok_or_else(|| AuthError::NotFound(format!("Identity {} not found", id)))?;

        if let Some(expected) = patch.expect_reset_hash.as_deref() {
            let still_held = identity
                .reset
                .as_ref()
                .map_or(false, |grant| grant.token_hash == expected);
            if !still_held {
                return Err(AuthError::InvalidResetToken);
            }
        }
        if let Some(now) = patch.redeemed_at {
            let expired = identity
                .reset
                .as_ref()
                .map_or(true, |grant| now > grant.expires_at);
            if expired {
                return Err(AuthError::ExpiredToken);
            }
        }

        match patch.password_hash {
            Some(digest) => {
                identity.password_hash = Some(digest);
                identity.reset = None;
            }
            None => match patch.reset {
                ResetChange::Keep => {}
                ResetChange::Set(grant) => identity.reset = Some(grant),
                ResetChange::Clear => identity.reset = None,
            },
        }
        identity.updated_at = Utc::now();

        Ok(identity.without_secrets())
    }

    async fn update_profile(&self, id: &str, patch: ProfilePatch) -> Result<Identity> {
        let mut tables = self.tables.write().await;
        let identity = tables
            .identities
            .get_mut(id)
            .ok_or_else(|| AuthError::NotFound(format!("Identity {} not found", id)))?;

        if let Some(name) = patch.name {
            identity.name = name;
        }
        if let Some(bio) = patch.bio {
            identity.bio = bio;
        }
        identity.updated_at = Utc::now();

        Ok(identity.without_secrets())
    }

    async fn list(&self) -> Result<Vec<Identity>> {
        let tables = self.tables.read().await;
        let mut identities: Vec<Identity> = tables
            .identities
            .values()
            .map(Identity::without_secrets)
            .collect();
        identities.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(identities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::PasswordDigest;
    use crate::auth::user::ResetGrant;

    fn new_identity(email: &str, mobile: &str) -> NewIdentity {
        NewIdentity {
            name: "ada lovelace".to_string(),
            bio: "analyst".to_string(),
            email: email.to_string(),
            mobile: mobile.to_string(),
            password_hash: PasswordDigest::from_stored("$argon2id$stub".to_string()),
        }
    }

    fn grant(hash: &str) -> ResetGrant {
        ResetGrant {
            token_hash: hash.to_string(),
            expires_at: Utc::now() + chrono::Duration::minutes(15),
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_email_and_hides_secret() {
        let store = MemoryCredentialStore::new();
        let created = store
            .create(new_identity("  Ada@Example.COM ", "5550100"))
            .await
            .unwrap();

        assert_eq!(created.email, "ada@example.com");
        assert_eq!(created.role, Role::User);
        assert!(created.password_hash.is_none());

        let found = store.find_by_email("ADA@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(found.password_hash.is_some());

        let public = store.find_by_id(&created.id, false).await.unwrap().unwrap();
        assert!(public.password_hash.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_mobile_conflicts() {
        let store = MemoryCredentialStore::new();
        store.create(new_identity("a@example.com", "5550100")).await.unwrap();

        let err = store
            .create(new_identity("b@example.com", "5550100"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_new_password_clears_reset_grant() {
        let store = MemoryCredentialStore::new();
        let created = store.create(new_identity("a@example.com", "1")).await.unwrap();

        store
            .update_secret_fields(&created.id, SecretPatch::set_reset(grant("abc")))
            .await
            .unwrap();
        assert!(store.find_by_reset_token("abc").await.unwrap().is_some());

        let digest = PasswordDigest::from_stored("$argon2id$other".to_string());
        store
            .update_secret_fields(&created.id, SecretPatch::password(digest.clone()))
            .await
            .unwrap();

        let stored = store.find_by_id(&created.id, true).await.unwrap().unwrap();
        assert!(stored.reset.is_none());
        assert_eq!(stored.password_hash, Some(digest));
        assert!(store.find_by_reset_token("abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redeem_requires_current_grant() {
        let store = MemoryCredentialStore::new();
        let created = store.create(new_identity("a@example.com", "1")).await.unwrap();
        store
            .update_secret_fields(&created.id, SecretPatch::set_reset(grant("first")))
            .await
            .unwrap();
        // A second request replaces the grant before the first link is used
        store
            .update_secret_fields(&created.id, SecretPatch::set_reset(grant("second")))
            .await
            .unwrap();

        let digest = PasswordDigest::from_stored("$argon2id$new".to_string());
        let err = store
            .update_secret_fields(
                &created.id,
                SecretPatch::redeem_reset(digest, "first".to_string(), Utc::now()),
            )
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidResetToken);

        let stored = store.find_by_id(&created.id, true).await.unwrap().unwrap();
        assert_eq!(stored.reset.unwrap().token_hash, "second");
    }

    #[tokio::test]
    async fn test_redeem_rejects_grant_expired_at_write_time() {
        let store = MemoryCredentialStore::new();
        let created = store.create(new_identity("a@example.com", "1")).await.unwrap();
        store
            .update_secret_fields(&created.id, SecretPatch::set_reset(grant("abc")))
            .await
            .unwrap();
        let before = store.find_by_id(&created.id, true).await.unwrap().unwrap();

        // Hashing took long enough for the grant to lapse
        let late = Utc::now() + chrono::Duration::minutes(16);
        let digest = PasswordDigest::from_stored("$argon2id$late".to_string());
        let err = store
            .update_secret_fields(
                &created.id,
                SecretPatch::redeem_reset(digest, "abc".to_string(), late),
            )
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::ExpiredToken);

        let after = store.find_by_id(&created.id, true).await.unwrap().unwrap();
        assert_eq!(after.password_hash, before.password_hash);
        assert!(after.reset.is_some());
    }

    #[tokio::test]
    async fn test_update_unknown_identity() {
        let store = MemoryCredentialStore::new();
        let err = store
            .update_profile("missing", ProfilePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }
}
