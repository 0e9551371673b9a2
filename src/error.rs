use std::error::Error;
use std::fmt;

use crate::constants::RESET_TOKEN_REJECTED;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    // Input errors
    ValidationError(String),
    Conflict(String),
    NotFound(String),

    // Session errors
    AuthenticationError(String),
    AuthorizationError(String),

    // Reset token errors
    ExpiredToken,
    InvalidResetToken,

    // Infrastructure errors
    StorageError(String),
    HashingError(String),
    MailError(String),

    // Configuration errors
    ConfigError(String),

    // System errors
    Internal(String),
}

impl AuthError {
    /// HTTP status code the transport layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ValidationError(_) => 400,
            Self::Conflict(_) => 409,
            Self::NotFound(_) => 404,
            Self::AuthenticationError(_) => 401,
            Self::AuthorizationError(_) => 403,
            Self::ExpiredToken | Self::InvalidResetToken => 401,
            Self::StorageError(_)
            | Self::HashingError(_)
            | Self::MailError(_)
            | Self::ConfigError(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Expired and unknown reset tokens share one message so a caller cannot
    /// probe which tokens exist. Infrastructure details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::ValidationError(msg)
            | Self::Conflict(msg)
            | Self::NotFound(msg)
            | Self::AuthenticationError(msg)
            | Self::AuthorizationError(msg) => msg.clone(),
            Self::ExpiredToken | Self::InvalidResetToken => RESET_TOKEN_REJECTED.to_string(),
            _ => "Something went wrong.".to_string(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::AuthenticationError(msg) => write!(f, "Authentication error: {}", msg),
            Self::AuthorizationError(msg) => write!(f, "Authorization error: {}", msg),
            Self::ExpiredToken => write!(f, "Reset token expired"),
            Self::InvalidResetToken => write!(f, "Reset token invalid or already used"),
            Self::StorageError(msg) => write!(f, "Storage error: {}", msg),
            Self::HashingError(msg) => write!(f, "Hashing error: {}", msg),
            Self::MailError(msg) => write!(f, "Mail error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl Error for AuthError {}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AuthError::AuthenticationError(format!("Invalid token: {}", err))
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Internal(format!("Background task failed: {}", err))
    }
}

// Generic result type for the auth core
pub type Result<T> = std::result::Result<T, AuthError>;
