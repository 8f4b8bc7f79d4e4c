//! Credential provider trait.

use crate::AccessToken;

/// Supplies the bearer credential for outbound requests.
///
/// The request layer asks for the credential on every call instead of
/// holding a mutable default header, so a token that is set or cleared
/// takes effect on the very next request.
pub trait CredentialProvider: Send + Sync {
    /// Returns the token to send, if any.
    fn access_token(&self) -> Option<AccessToken>;

    /// Returns the `Authorization` header value, if a token is present.
    fn authorization(&self) -> Option<String> {
        self.access_token().map(|t| t.bearer_header())
    }
}

/// A provider that never supplies a credential.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl CredentialProvider for Anonymous {
    fn access_token(&self) -> Option<AccessToken> {
        None
    }
}

/// A provider that always supplies the same token.
#[derive(Debug, Clone)]
pub struct StaticToken(pub AccessToken);

impl CredentialProvider for StaticToken {
    fn access_token(&self) -> Option<AccessToken> {
        Some(self.0.clone())
    }
}
