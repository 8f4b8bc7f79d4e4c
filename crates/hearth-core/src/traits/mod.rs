//! Core traits at the seams between the session core and its collaborators.

mod credentials;
mod identity;
mod storage;

pub use credentials::{Anonymous, CredentialProvider, StaticToken};
pub use identity::{IdentityApi, TokenGrant};
pub use storage::{ACCESS_TOKEN_KEY, MemoryTokenStorage, TokenStorage};
