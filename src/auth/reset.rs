//! Single-use password reset tokens
//!
//! The raw token leaves the service exactly once, inside the reset link. The
//! store only ever sees its SHA-256 digest, so a leaked database cannot be used
//! to forge a reset.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::auth::user::ResetGrant;
use crate::constants::{RESET_TOKEN_BYTES, RESET_TOKEN_TTL_MINUTES};
use crate::security::constant_time_eq;

/// Freshly issued reset token
#[derive(Debug, Clone)]
pub struct IssuedResetToken {
    /// Sent to the user, never persisted
    pub raw: String,
    pub hashed: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedResetToken {
    /// The part of the token that gets persisted
    pub fn grant(&self) -> ResetGrant {
        ResetGrant {
            token_hash: self.hashed.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// Outcome of checking a caller-supplied token against a stored grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTokenStatus {
    Valid,
    Mismatch,
    Expired,
}

/// Hex SHA-256 digest of a raw reset token
pub fn hash_reset_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Issue a reset token valid for 15 minutes from now
pub fn issue_reset_token() -> IssuedResetToken {
    issue_reset_token_at(Utc::now())
}

pub fn issue_reset_token_at(now: DateTime<Utc>) -> IssuedResetToken {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let raw = hex::encode(bytes);

    IssuedResetToken {
        hashed: hash_reset_token(&raw),
        raw,
        expires_at: now + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
    }
}

/// Compare a raw token with a stored hash and expiry at `now`
pub fn check_reset_token(
    raw: &str,
    stored_hash: &str,
    stored_expiry: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ResetTokenStatus {
    if !constant_time_eq(&hash_reset_token(raw), stored_hash) {
        return ResetTokenStatus::Mismatch;
    }
    if now > stored_expiry {
        return ResetTokenStatus::Expired;
    }
    ResetTokenStatus::Valid
}

/// True when the raw token matches the stored hash and has not expired.
///
/// The caller must clear the stored grant in the same write that applies the
/// new password.
pub fn consume_reset_token(raw: &str, stored_hash: &str, stored_expiry: DateTime<Utc>) -> bool {
    check_reset_token(raw, stored_hash, stored_expiry, Utc::now()) == ResetTokenStatus::Valid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_shape() {
        let now = Utc::now();
        let token = issue_reset_token_at(now);
        assert_eq!(token.raw.len(), RESET_TOKEN_BYTES * 2);
        assert_eq!(token.hashed.len(), 64);
        assert_ne!(token.raw, token.hashed);
        assert_eq!(token.expires_at - now, Duration::minutes(15));
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = issue_reset_token();
        let b = issue_reset_token();
        assert_ne!(a.raw, b.raw);
        assert_ne!(a.hashed, b.hashed);
    }

    #[test]
    fn test_check_reset_token_states() {
        let now = Utc::now();
        let token = issue_reset_token_at(now);

        assert_eq!(
            check_reset_token(&token.raw, &token.hashed, token.expires_at, now),
            ResetTokenStatus::Valid
        );
        assert_eq!(
            check_reset_token(&token.raw, &token.hashed, token.expires_at, token.expires_at),
            ResetTokenStatus::Valid
        );
        assert_eq!(
            check_reset_token("not-the-token", &token.hashed, token.expires_at, now),
            ResetTokenStatus::Mismatch
        );
        assert_eq!(
            check_reset_token(
                &token.raw,
                &token.hashed,
                token.expires_at,
                token.expires_at + Duration::seconds(1)
            ),
            ResetTokenStatus::Expired
        );
    }

    #[test]
    fn test_consume_rejects_stored_hash_as_raw() {
        let token = issue_reset_token();
        assert!(consume_reset_token(&token.raw, &token.hashed, token.expires_at));
        assert!(!consume_reset_token(&token.hashed, &token.hashed, token.expires_at));
    }
}
