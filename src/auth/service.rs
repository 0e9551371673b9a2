//! Account operations: registration, login, logout, password change and reset
//!
//! Every operation returns a `Result` with an `AuthError`; the HTTP layer
//! decides how that looks on the wire.

use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::cookie::SessionCookie;
use crate::auth::password::PasswordHasher;
use crate::auth::reset::{check_reset_token, hash_reset_token, issue_reset_token, ResetTokenStatus};
use crate::auth::token::TokenManager;
use crate::auth::user::{normalize_email, Identity};
use crate::config::AuthConfig;
use crate::constants::{MAX_NAME_LEN, MIN_NAME_LEN, MIN_PASSWORD_LEN};
use crate::error::{AuthError, Result};
use crate::mailer::{password_reset_mail, Mailer};
use crate::security::AuthTimer;
use crate::storage::{CredentialStore, NewIdentity, ProfilePatch, SecretPatch};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub bio: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordRequest {
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub identity: Identity,
    pub token: String,
    pub cookie: SessionCookie,
}

/// Account lifecycle service
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenManager>,
    hasher: PasswordHasher,
    mailer: Arc<dyn Mailer>,
    client_origin: String,
}

impl AccountService {
    pub fn new(
        config: &AuthConfig,
        store: Arc<dyn CredentialStore>,
        tokens: Arc<TokenManager>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher: PasswordHasher::new(),
            mailer,
            client_origin: config.client_origin.clone(),
        }
    }

    /// Create a new identity with role USER
    pub async fn register(&self, request: RegisterRequest) -> Result<Identity> {
        let RegisterRequest {
            name,
            bio,
            email,
            mobile,
            password,
            confirm_password,
        } = request;

        if [&name, &bio, &email, &mobile, &password, &confirm_password]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(validation("All fields must be filled."));
        }

        let email = normalize_email(&email);
        if !is_valid_email(&email) {
            return Err(validation("Email-ID must be in valid format."));
        }
        if password != confirm_password {
            return Err(validation("Password & Confirm password should be matched."));
        }
        validate_password(&password)?;
        let name = normalize_name(&name)?;

        // Fast path; the store re-checks under its write lock
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::Conflict("Email-ID is already exist.".to_string()));
        }

        let password_hash = self.hasher.hash_async(password).await?;
        let identity = self
            .store
            .create(NewIdentity {
                name,
                bio: bio.trim().to_lowercase(),
                email,
                mobile: mobile.trim().to_string(),
                password_hash,
            })
            .await?;

        log::info!("Registered identity {}", identity.id);
        Ok(identity)
    }

    /// Check credentials and issue a session token
    pub async fn login(&self, request: LoginRequest) -> Result<LoginOutcome> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(validation("All fields must be filled."));
        }

        let timer = AuthTimer::for_login();
        let stored = self.store.find_by_email(&request.email).await?;

        let digest = match stored.as_ref().and_then(|identity| identity.password_hash.clone()) {
            Some(digest) => digest,
            None => {
                log::warn!("Login failed: unknown email");
                timer.wait().await;
                return Err(invalid_credentials());
            }
        };

        if !self.hasher.verify_async(request.password, digest).await? {
            log::warn!("Login failed: wrong password");
            timer.wait().await;
            return Err(invalid_credentials());
        }

        let identity = match stored {
            Some(identity) => identity.without_secrets(),
            None => return Err(invalid_credentials()),
        };
        let token = self.tokens.issue_session_token(&identity)?;
        log::info!(
            "Identity {} logged in, session valid for {}s",
            identity.id,
            self.tokens.ttl().as_secs()
        );

        Ok(LoginOutcome {
            cookie: SessionCookie::login(&token),
            identity,
            token,
        })
    }

    /// Expire the session cookie. Tokens are stateless, so an already copied
    /// token stays valid until its own expiry.
    pub async fn logout(&self, identity: &Identity) -> Result<SessionCookie> {
        self.user_details(identity).await?;
        log::info!("Identity {} logged out", identity.id);
        Ok(SessionCookie::logout())
    }

    pub async fn change_password(
        &self,
        identity: &Identity,
        request: ChangePasswordRequest,
    ) -> Result<Identity> {
        if request.old_password.is_empty() || request.new_password.is_empty() {
            return Err(validation("Both old and new passwords must be provided."));
        }

        let stored = self
            .store
            .find_by_id(&identity.id, true)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found.".to_string()))?;
        let digest = stored
            .password_hash
            .ok_or_else(|| AuthError::StorageError("Stored identity has no password".to_string()))?;

        if !self
            .hasher
            .verify_async(request.old_password, digest.clone())
            .await?
        {
            return Err(AuthError::AuthenticationError("Invalid old password.".to_string()));
        }
        if self
            .hasher
            .verify_async(request.new_password.clone(), digest)
            .await?
        {
            return Err(validation("New password should not match the old password."));
        }
        validate_password(&request.new_password)?;

        let new_digest = self.hasher.hash_async(request.new_password).await?;
        let updated = self
            .store
            .update_secret_fields(&identity.id, SecretPatch::password(new_digest))
            .await?;

        log::info!("Identity {} changed password", identity.id);
        Ok(updated)
    }

    /// Issue a reset token and mail the link. Returns the address mailed.
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> Result<String> {
        if request.email.trim().is_empty() {
            return Err(validation("Email address is required."));
        }

        let identity = self
            .store
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| {
                AuthError::NotFound(
                    "The provided email address does not exist. Please register.".to_string(),
                )
            })?;

        let issued = issue_reset_token();
        self.store
            .update_secret_fields(&identity.id, SecretPatch::set_reset(issued.grant()))
            .await?;

        let mail = password_reset_mail(&identity.email, &self.client_origin, &issued.raw);
        if let Err(e) = self.mailer.send(mail).await {
            // The grant is already stored; the user can ask again
            log::error!(
                "Failed to send reset mail via {} for identity {}: {}",
                self.mailer.mailer_name(),
                identity.id,
                e
            );
        }

        Ok(identity.email)
    }

    /// Redeem a reset token and set a new password in one write
    pub async fn reset_password(
        &self,
        raw_token: &str,
        request: ResetPasswordRequest,
    ) -> Result<Identity> {
        if request.password.is_empty() {
            return Err(validation("Password is required."));
        }
        validate_password(&request.password)?;

        let token_hash = hash_reset_token(raw_token);
        let identity = self
            .store
            .find_by_reset_token(&token_hash)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;
        let grant = identity.reset.as_ref().ok_or(AuthError::InvalidResetToken)?;

        match check_reset_token(raw_token, &grant.token_hash, grant.expires_at, Utc::now()) {
            ResetTokenStatus::Valid => {}
            ResetTokenStatus::Expired => {
                log::debug!("Expired reset token presented for identity {}", identity.id);
                return Err(AuthError::ExpiredToken);
            }
            ResetTokenStatus::Mismatch => return Err(AuthError::InvalidResetToken),
        }

        let digest = self.hasher.hash_async(request.password).await?;
        let updated = self
            .store
            .update_secret_fields(
                &identity.id,
                SecretPatch::redeem_reset(digest, token_hash, Utc::now()),
            )
            .await?;

        log::info!("Identity {} reset password", identity.id);
        Ok(updated)
    }

    /// Fresh copy of the caller's identity
    pub async fn user_details(&self, identity: &Identity) -> Result<Identity> {
        self.store
            .find_by_id(&identity.id, false)
            .await?
            .ok_or_else(|| {
                AuthError::NotFound(
                    "User is not logged in, Please log in or does not exist.".to_string(),
                )
            })
    }

    pub async fn update_profile(
        &self,
        identity: &Identity,
        request: UpdateProfileRequest,
    ) -> Result<Identity> {
        let patch = ProfilePatch {
            name: match request.name.filter(|n| !n.trim().is_empty()) {
                Some(name) => Some(normalize_name(&name)?),
                None => None,
            },
            bio: request
                .bio
                .map(|bio| bio.trim().to_lowercase())
                .filter(|bio| !bio.is_empty()),
        };

        if patch.is_empty() {
            return self.user_details(identity).await;
        }
        self.store.update_profile(&identity.id, patch).await
    }

    /// All identities, for administrators
    pub async fn list_identities(&self) -> Result<Vec<Identity>> {
        self.store.list().await
    }
}

fn validation(message: &str) -> AuthError {
    AuthError::ValidationError(message.to_string())
}

fn invalid_credentials() -> AuthError {
    AuthError::AuthenticationError("Invalid Email-ID or Password.".to_string())
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::ValidationError(format!(
            "Password must be at least {} characters long.",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn normalize_name(name: &str) -> Result<String> {
    let name = name.trim().to_lowercase();
    let len = name.chars().count();
    if len < MIN_NAME_LEN {
        return Err(AuthError::ValidationError(format!(
            "Name must be at least {} characters long.",
            MIN_NAME_LEN
        )));
    }
    if len > MAX_NAME_LEN {
        return Err(AuthError::ValidationError(format!(
            "Name should be less than {} characters long.",
            MAX_NAME_LEN
        )));
    }
    Ok(name)
}

/// Structural email check: one `@`, non-empty local part, dotted domain
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}
