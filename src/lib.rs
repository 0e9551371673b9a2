//! Course Auth - authentication core for an online course platform
//!
//! This library provides password hashing, session tokens, the password
//! reset flow and a role gate, plus the warp routes that expose them.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod security;
pub mod storage;

// Re-export main components
pub use config::*;
pub use constants::*;
