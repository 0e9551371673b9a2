//! One-way password hashing
//!
//! Digests are Argon2id PHC strings with a fresh random salt per call, so two
//! hashes of the same plaintext never compare equal. The salt and parameters
//! travel inside the digest, which is all `verify` needs.

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use std::fmt;

use crate::error::{AuthError, Result};

/// An already-hashed password.
///
/// Only [`PasswordHasher::hash`] produces one from plaintext, so a digest can
/// never be fed back through the hasher by mistake.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a digest loaded from persistent storage
    pub fn from_stored(phc: String) -> Self {
        Self(phc)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

/// Salted one-way password hasher
#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a plaintext password with a fresh salt
    pub fn hash(&self, plaintext: &str) -> Result<PasswordDigest> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| PasswordDigest(hash.to_string()))
            .map_err(|e| AuthError::HashingError(format!("Failed to hash password: {}", e)))
    }

    /// Check a plaintext against a digest. Malformed digests never match.
    pub fn verify(&self, plaintext: &str, digest: &PasswordDigest) -> bool {
        match PasswordHash::new(digest.as_str()) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                log::error!("Stored password digest is malformed: {}", e);
                false
            }
        }
    }

    /// Hash on the blocking pool so request tasks keep running
    pub async fn hash_async(&self, plaintext: String) -> Result<PasswordDigest> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext)).await?
    }

    /// Verify on the blocking pool
    pub async fn verify_async(&self, plaintext: String, digest: PasswordDigest) -> Result<bool> {
        let hasher = self.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &digest)).await?)
    }
}
