use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::auth::user::{Identity, Role};
use crate::config::AuthConfig;
use crate::error::{AuthError, Result};

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity ID)
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Expiration time (as UTC timestamp)
    pub exp: i64,
    /// Issued at (as UTC timestamp)
    pub iat: i64,
}

impl Claims {
    /// Creates claims for an identity, valid for `ttl` from `issued_at`
    pub fn for_identity(
        identity: &Identity,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self> {
        let iat = issued_at.timestamp();
        let exp = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| iat.checked_add(secs))
            .ok_or_else(|| {
                AuthError::Internal(format!("Token lifetime {}s is out of range", ttl.as_secs()))
            })?;

        Ok(Self {
            sub: identity.id.clone(),
            email: identity.email.clone(),
            role: identity.role,
            exp,
            iat,
        })
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Signs and verifies session tokens
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenManager {
    /// Creates a new token manager with a secret and token lifetime
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.jwt_ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a session token for the identity, expiring after the configured TTL
    pub fn issue_session_token(&self, identity: &Identity) -> Result<String> {
        self.issue_session_token_at(identity, Utc::now())
    }

    /// Issues a session token as if it had been created at `issued_at`
    pub fn issue_session_token_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String> {
        let claims = Claims::for_identity(identity, issued_at, self.ttl)?;
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validates signature, structure and expiry, returning the claims
    pub fn verify_session_token(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;

        // jsonwebtoken already enforces exp; keep the check local for clock-skewed callers
        if data.claims.is_expired() {
            return Err(AuthError::AuthenticationError("Token expired".to_string()));
        }

        Ok(data.claims)
    }
}

/// Extracts bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<String> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
