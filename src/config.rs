//! Service configuration module
//! Loads the signing secret, token lifetime and transport settings once at startup

use crate::constants::{DEFAULT_HOST, DEFAULT_PORT, MAX_TOKEN_TTL_SECS};
use crate::error::{AuthError, Result};
use std::env;
use std::time::Duration;

/// Service configuration parameters
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub host: String,
    pub port: u16,
    /// JWT secret for session token signing/validation
    pub jwt_secret: String,
    /// Lifetime of issued session tokens
    pub jwt_ttl: Duration,
    /// Front-end origin used for CORS and for password reset links
    pub client_origin: String,
    /// TLS configuration
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
    /// Enable TLS
    pub enable_tls: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        panic!("AuthConfig::default() is not allowed for security reasons. Use AuthConfig::from_env() instead.");
    }
}

impl AuthConfig {
    /// Create a test configuration - DANGEROUS: Only for testing!
    pub fn for_testing() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            jwt_secret: "test-jwt-secret-only-for-unit-tests-never-use-in-production".to_string(),
            jwt_ttl: Duration::from_secs(12 * 3600),
            client_origin: "http://localhost:5173".to_string(),
            tls_cert_path: None,
            tls_key_path: None,
            enable_tls: false,
        }
    }

    /// Validate that the signing secret meets security requirements
    fn validate_jwt_secret(secret: &str) -> Result<()> {
        if secret.len() < 32 {
            return Err(AuthError::ConfigError(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        // Check for insecure default or example values
        let insecure_patterns = [
            "your-secret-key",
            "change-this",
            "changeme",
            "test-secret",
            "default",
            "secret",
            "password",
            "12345",
        ];

        for pattern in &insecure_patterns {
            if secret.to_lowercase().contains(pattern) {
                return Err(AuthError::ConfigError(format!(
                    "JWT secret contains insecure pattern '{}'. Please use a secure random secret generated with: openssl rand -base64 32",
                    pattern
                )));
            }
        }

        if secret.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AuthError::ConfigError(
                "JWT secret should contain mixed characters (letters, numbers, symbols) for security".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate the client origin is an absolute http(s) URL without a path
    fn validate_client_origin(origin: &str) -> Result<String> {
        let parsed = url::Url::parse(origin).map_err(|e| {
            AuthError::ConfigError(format!("CLIENT_ORIGIN is not a valid URL ({}): {}", origin, e))
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AuthError::ConfigError(format!(
                "CLIENT_ORIGIN must use http or https, got {}",
                parsed.scheme()
            )));
        }
        if parsed.path() != "/" || parsed.query().is_some() {
            return Err(AuthError::ConfigError(
                "CLIENT_ORIGIN must be an origin without path or query".to_string(),
            ));
        }

        // Url::parse normalizes "https://a.b" to "https://a.b/"; reset links add their own slash
        Ok(origin.trim_end_matches('/').to_string())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let host = env::var("COURSE_AUTH_HOST").unwrap_or(DEFAULT_HOST.to_string());
        let port = env::var("COURSE_AUTH_PORT")
            .or_else(|_| env::var("PORT"))
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let jwt_secret = env::var("COURSE_AUTH_JWT_SECRET")
            .or_else(|_| env::var("JWT_SECRET"))
            .map_err(|_| {
                AuthError::ConfigError(
                    "JWT_SECRET environment variable is required for security. \
                     Generate one with: openssl rand -base64 32"
                        .to_string(),
                )
            })?;

        let jwt_expiry = env::var("COURSE_AUTH_JWT_EXPIRY")
            .or_else(|_| env::var("JWT_EXPIRY"))
            .map_err(|_| {
                AuthError::ConfigError(
                    "JWT_EXPIRY environment variable is required (e.g. 12h, 30m, 86400)".to_string(),
                )
            })?;
        let jwt_ttl = parse_duration(&jwt_expiry)?;

        let client_origin = env::var("COURSE_AUTH_CLIENT_ORIGIN")
            .or_else(|_| env::var("CORS_ORIGIN"))
            .map_err(|_| {
                AuthError::ConfigError(
                    "CORS_ORIGIN environment variable is required to build password reset links"
                        .to_string(),
                )
            })?;
        let client_origin = Self::validate_client_origin(&client_origin)?;

        // TLS configuration
        let enable_tls = env::var("COURSE_AUTH_ENABLE_TLS")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        let tls_cert_path = env::var("COURSE_AUTH_TLS_CERT_PATH").ok();
        let tls_key_path = env::var("COURSE_AUTH_TLS_KEY_PATH").ok();

        if enable_tls {
            match (&tls_cert_path, &tls_key_path) {
                (Some(cert_path), Some(key_path)) => {
                    if !std::path::Path::new(cert_path).exists() {
                        return Err(AuthError::ConfigError(format!(
                            "TLS certificate file does not exist: {}",
                            cert_path
                        )));
                    }
                    if !std::path::Path::new(key_path).exists() {
                        return Err(AuthError::ConfigError(format!(
                            "TLS private key file does not exist: {}",
                            key_path
                        )));
                    }
                }
                _ => {
                    return Err(AuthError::ConfigError(
                        "TLS is enabled but COURSE_AUTH_TLS_CERT_PATH or COURSE_AUTH_TLS_KEY_PATH is not set".to_string(),
                    ));
                }
            }
        }

        Self::validate_jwt_secret(&jwt_secret)?;

        Ok(Self {
            host,
            port,
            jwt_secret,
            jwt_ttl,
            client_origin,
            tls_cert_path,
            tls_key_path,
            enable_tls,
        })
    }
}

/// Parse a lifetime such as `12h`, `30m`, `45s`, `7d` or a bare number of seconds
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let invalid = || AuthError::ConfigError(format!("Invalid duration '{}'", raw));

    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let value: u64 = digits.parse().map_err(|_| invalid())?;

    let multiplier = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86400,
        _ => return Err(invalid()),
    };

    if value == 0 {
        return Err(AuthError::ConfigError(
            "Token lifetime must be greater than zero".to_string(),
        ));
    }

    let secs = value.checked_mul(multiplier).ok_or_else(invalid)?;
    if secs > MAX_TOKEN_TTL_SECS {
        return Err(AuthError::ConfigError(format!(
            "Token lifetime '{}' exceeds the maximum of 365d",
            raw
        )));
    }

    Ok(Duration::from_secs(secs))
}
