//! hearth-core - Core types and traits for the hearth auth session toolkit.

pub mod credentials;
pub mod error;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::{LoginCredentials, SignupRequest};
pub use error::Error;
pub use tokens::AccessToken;
pub use traits::{
    ACCESS_TOKEN_KEY, CredentialProvider, IdentityApi, MemoryTokenStorage, TokenGrant,
    TokenStorage,
};
pub use types::{ApiUrl, DEFAULT_API_URL, UserProfile};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
