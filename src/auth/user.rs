use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::password::PasswordDigest;

/// Platform-wide role of an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

/// Hashed single-use reset credential and the instant it stops being accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetGrant {
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// A registered principal
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    /// Unique identifier, assigned at creation
    pub id: String,
    /// Display name (stored lowercase)
    pub name: String,
    pub bio: String,
    /// Lookup key, trimmed and lowercased
    pub email: String,
    pub mobile: String,
    pub role: Role,
    /// Only populated when the store is asked to include secrets
    #[serde(skip_serializing)]
    pub password_hash: Option<PasswordDigest>,
    #[serde(skip_serializing)]
    pub reset: Option<ResetGrant>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Copy of this identity with secret fields removed
    pub fn without_secrets(&self) -> Self {
        Self {
            password_hash: None,
            reset: None,
            ..self.clone()
        }
    }

    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }
}

/// Normalize an email address into its lookup key
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
