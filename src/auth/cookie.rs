//! Session cookie policy
//!
//! The session token travels in an `HttpOnly`, `Secure` cookie named `token`.
//! Login sets it for 12 hours, logout overwrites it with an empty value that
//! expires immediately.

use crate::constants::{SESSION_COOKIE_MAX_AGE_SECS, SESSION_COOKIE_NAME};

/// Outbound session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    value: String,
    max_age_secs: i64,
}

impl SessionCookie {
    /// Cookie carrying a freshly issued session token
    pub fn login(token: &str) -> Self {
        Self {
            value: token.to_string(),
            max_age_secs: SESSION_COOKIE_MAX_AGE_SECS,
        }
    }

    /// Cookie that makes the browser drop the session
    pub fn logout() -> Self {
        Self {
            value: String::new(),
            max_age_secs: 0,
        }
    }

    pub fn max_age_secs(&self) -> i64 {
        self.max_age_secs
    }

    /// Value for a `Set-Cookie` header
    pub fn header_value(&self) -> String {
        format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; Secure",
            SESSION_COOKIE_NAME, self.value, self.max_age_secs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_cookie_attributes() {
        let header = SessionCookie::login("abc.def.ghi").header_value();
        assert!(header.starts_with("token=abc.def.ghi;"));
        assert!(header.contains("Max-Age=43200"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Secure"));
    }

    #[test]
    fn test_logout_cookie_expires_immediately() {
        let cookie = SessionCookie::logout();
        assert_eq!(cookie.max_age_secs(), 0);
        assert!(cookie.header_value().starts_with("token=;"));
        assert!(cookie.header_value().contains("Max-Age=0"));
    }
}
