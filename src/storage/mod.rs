//! Identity persistence: the store interface and an in-memory backend

pub mod memory;
pub mod traits;

pub use memory::MemoryCredentialStore;
pub use traits::{CredentialStore, NewIdentity, ProfilePatch, ResetChange, SecretPatch};
