// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const API_PREFIX: &str = "user-profile";

// Longest accepted session token lifetime
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

// Session cookie policy
pub const SESSION_COOKIE_NAME: &str = "token";
pub const SESSION_COOKIE_MAX_AGE_SECS: i64 = 12 * 60 * 60;

// Password reset tokens
pub const RESET_TOKEN_BYTES: usize = 20;
pub const RESET_TOKEN_TTL_MINUTES: i64 = 15;
pub const RESET_TOKEN_REJECTED: &str = "Invalid or expired token. Please try again.";

// Input limits
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 50;
pub const MAX_TOKEN_LEN: usize = 1000;
pub const MAX_BODY_BYTES: u64 = 16 * 1024;

// Minimum time spent answering a login attempt
pub const LOGIN_MIN_DURATION_MS: u64 = 100;
