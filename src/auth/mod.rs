//! Authentication and authorization module

pub mod cookie;
pub mod gate;
pub mod password;
pub mod reset;
pub mod service;
pub mod token;
pub mod user;

// Re-export main components
pub use cookie::SessionCookie;
pub use gate::{AuthGate, TokenSource};
pub use password::{PasswordDigest, PasswordHasher};
pub use reset::{consume_reset_token, issue_reset_token, IssuedResetToken, ResetTokenStatus};
pub use service::AccountService;
pub use token::{Claims, TokenManager};
pub use user::{Identity, ResetGrant, Role};
