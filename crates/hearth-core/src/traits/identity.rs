//! Identity API trait.

use async_trait::async_trait;

use crate::types::UserProfile;
use crate::{AccessToken, LoginCredentials, Result, SignupRequest};

/// Output from a successful login.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    /// The bearer token to attach to later requests.
    pub access_token: AccessToken,
    /// Token scheme reported by the server (normally "bearer").
    pub token_type: String,
}

/// The remote identity service.
///
/// Implementations decide how requests are authenticated; the HTTP client
/// consults a [`CredentialProvider`](super::CredentialProvider) on every
/// call to [`IdentityApi::me`].
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// Exchange email and password for a bearer token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<TokenGrant>;

    /// Create a new account. Does not log in.
    async fn signup(&self, request: &SignupRequest) -> Result<UserProfile>;

    /// Fetch the profile belonging to the current bearer credential.
    async fn me(&self) -> Result<UserProfile>;
}
