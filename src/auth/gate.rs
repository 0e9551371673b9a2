//! Request-time authentication and authorization
//!
//! Two gates run in sequence for every protected operation:
//!
//! 1. authentication resolves a bearer token into a stored identity
//!    (no token or a bad token gives 401),
//! 2. authorization checks the identity's single role against the role set
//!    the operation declares (mismatch gives 403). Roles do not inherit.

use std::sync::Arc;

use crate::auth::token::{extract_bearer_token, TokenManager};
use crate::auth::user::{Identity, Role};
use crate::constants::MAX_TOKEN_LEN;
use crate::error::{AuthError, Result};
use crate::storage::CredentialStore;

/// Where the caller's token was found, if anywhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    NoToken,
    Bearer(String),
}

impl TokenSource {
    /// Session cookie first, then `Authorization: Bearer`
    pub fn from_request(cookie: Option<String>, authorization: Option<String>) -> Self {
        if let Some(token) = cookie.filter(|value| !value.is_empty()) {
            log::debug!("Token extracted from session cookie");
            return TokenSource::Bearer(token);
        }

        if let Some(token) = authorization.as_deref().and_then(extract_bearer_token) {
            log::debug!("Token extracted from Authorization header");
            return TokenSource::Bearer(token);
        }

        TokenSource::NoToken
    }
}

/// Authentication and role gate for protected operations
#[derive(Clone)]
pub struct AuthGate {
    tokens: Arc<TokenManager>,
    store: Arc<dyn CredentialStore>,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenManager>, store: Arc<dyn CredentialStore>) -> Self {
        Self { tokens, store }
    }

    /// Resolve the caller's identity, without secrets
    pub async fn authenticate(&self, source: TokenSource) -> Result<Identity> {
        let token = match source {
            TokenSource::NoToken => {
                return Err(AuthError::AuthenticationError(
                    "Unauthorized access! Please login first.".to_string(),
                ));
            }
            TokenSource::Bearer(token) => token,
        };

        if token.len() > MAX_TOKEN_LEN || token.chars().any(|c| c.is_control()) {
            log::warn!("Rejected malformed session token");
            return Err(invalid_access_token());
        }

        let claims = match self.tokens.verify_session_token(&token) {
            Ok(claims) => claims,
            Err(e) => {
                log::debug!("Session token rejected: {}", e);
                return Err(invalid_access_token());
            }
        };

        match self.store.find_by_id(&claims.sub, false).await? {
            Some(identity) => Ok(identity),
            None => {
                log::warn!("Session token refers to missing identity {}", claims.sub);
                Err(invalid_access_token())
            }
        }
    }

    /// Check the identity's role against the operation's allowed roles
    pub fn authorize(&self, identity: &Identity, allowed: &[Role]) -> Result<()> {
        if identity.has_role(allowed) {
            return Ok(());
        }

        log::warn!(
            "Permission denied for identity {} with role {}",
            identity.id,
            identity.role.as_str()
        );
        Err(AuthError::AuthorizationError(
            "You do not have permission to view this route.".to_string(),
        ))
    }

    /// Both gates in sequence
    pub async fn authenticate_with_roles(
        &self,
        source: TokenSource,
        allowed: &[Role],
    ) -> Result<Identity> {
        let identity = self.authenticate(source).await?;
        self.authorize(&identity, allowed)?;
        Ok(identity)
    }
}

fn invalid_access_token() -> AuthError {
    AuthError::AuthenticationError("Invalid Access Token.".to_string())
}
