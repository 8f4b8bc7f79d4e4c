//! HTTP-backed identity API.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use hearth_core::traits::{IdentityApi, TokenGrant};
use hearth_core::{
    AccessToken, ApiUrl, CredentialProvider, LoginCredentials, Result, SignupRequest, UserProfile,
};

use crate::client::ApiClient;
use crate::endpoints::{LOGIN, LoginRequest, LoginResponse, ME, SIGNUP, SignupBody};

/// Identity API spoken over REST/JSON.
#[derive(Debug, Clone)]
pub struct HttpIdentityApi {
    client: ApiClient,
}

impl HttpIdentityApi {
    /// Create a client for the identity API at `base`, authenticating
    /// profile requests with whatever `credentials` supplies at call time.
    pub fn new(base: ApiUrl, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(base, credentials)?,
        })
    }
}

#[async_trait]
impl IdentityApi for HttpIdentityApi {
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    async fn login(&self, credentials: &LoginCredentials) -> Result<TokenGrant> {
        let request = LoginRequest {
            email: credentials.email(),
            password: credentials.password(),
        };

        let response: LoginResponse = self.client.post(LOGIN, &request).await?;
        debug!(token_type = %response.token_type, "Login accepted");

        Ok(TokenGrant {
            access_token: AccessToken::new(response.access_token),
            token_type: response.token_type,
        })
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn signup(&self, request: &SignupRequest) -> Result<UserProfile> {
        let body = SignupBody {
            first_name: &request.first_name,
            last_name: &request.last_name,
            email: &request.email,
            password: request.password(),
        };

        let user: UserProfile = self.client.post(SIGNUP, &body).await?;
        debug!(user_id = user.id, "Account created");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn me(&self) -> Result<UserProfile> {
        self.client.get_authed(ME).await
    }
}
