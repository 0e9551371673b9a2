//! Timing side-channel helpers
//!
//! Reset token digests are compared without early exit, and login answers
//! are padded to a minimum duration so an unknown email and a wrong password
//! take the same time to fail.

use std::time::{Duration, Instant};

use crate::constants::LOGIN_MIN_DURATION_MS;

/// Constant-time byte comparison. Length is not treated as secret.
pub fn constant_time_eq_bytes(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Constant-time string comparison
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    constant_time_eq_bytes(a.as_bytes(), b.as_bytes())
}

/// Sleep until at least `min_duration` has passed since `start_time`
pub async fn add_auth_delay(start_time: Instant, min_duration: Duration) {
    let elapsed = start_time.elapsed();
    if elapsed < min_duration {
        tokio::time::sleep(min_duration - elapsed).await;
    }
}

/// Pads an authentication attempt to a minimum duration
pub struct AuthTimer {
    start: Instant,
    min_duration: Duration,
}

impl AuthTimer {
    pub fn new(min_duration: Duration) -> Self {
        Self {
            start: Instant::now(),
            min_duration,
        }
    }

    /// Timer for a login attempt
    pub fn for_login() -> Self {
        Self::new(Duration::from_millis(LOGIN_MIN_DURATION_MS))
    }

    pub async fn wait(self) {
        add_auth_delay(self.start, self.min_duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq() {
        let digest = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";
        assert!(constant_time_eq(digest, digest));
        assert!(!constant_time_eq(digest, &digest.replace('9', "8")));
        assert!(!constant_time_eq(digest, &digest[1..]));
        assert!(!constant_time_eq("", "a"));
    }

    #[test]
    fn test_constant_time_eq_bytes() {
        assert!(constant_time_eq_bytes(b"token", b"token"));
        assert!(!constant_time_eq_bytes(b"token", b"tokem"));
        assert!(constant_time_eq_bytes(b"", b""));
    }

    #[tokio::test]
    async fn test_auth_timer() {
        let timer = AuthTimer::new(Duration::from_millis(10));
        let start = Instant::now();
        timer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
