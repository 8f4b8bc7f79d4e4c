//! HTTP client for the identity API.

use std::fmt;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use hearth_core::error::{ApiError, Error, InvalidInputError, TransportError};
use hearth_core::{ApiUrl, CredentialProvider, Result};

use crate::endpoints::ErrorResponse;

fn map_reqwest(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        TransportError::Decode {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}

/// HTTP client bound to one identity API base URL.
///
/// Authenticated requests ask the [`CredentialProvider`] for the current
/// token on every call.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: ApiUrl,
    credentials: Arc<dyn CredentialProvider>,
}

impl ApiClient {
    /// Create a new client for the given API base URL.
    pub fn new(base: ApiUrl, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("hearth/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(map_reqwest)?;

        Ok(Self {
            client,
            base,
            credentials,
        })
    }

    /// Returns the API base URL this client is configured for.
    pub fn base(&self) -> &ApiUrl {
        &self.base
    }

    /// Make an unauthenticated POST with a JSON body.
    #[instrument(skip(self, body), fields(api = %self.base))]
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.base.endpoint(path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest)?;

        self.handle_response(response).await
    }

    /// Make a GET carrying the provider's bearer token, if there is one.
    ///
    /// Without a token the request is still sent; the server answers 401.
    #[instrument(skip(self), fields(api = %self.base))]
    pub async fn get_authed<R>(&self, path: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let url = self.base.endpoint(path);
        debug!(%url, "GET (authenticated)");

        let mut request = self.client.get(&url);
        match self.credentials.authorization() {
            Some(value) => {
                let header = HeaderValue::from_str(&value).map_err(|_| {
                    Error::InvalidInput(InvalidInputError::Other {
                        message: "token contains characters not allowed in a header".to_string(),
                    })
                })?;
                request = request.header(AUTHORIZATION, header);
            }
            None => debug!("No credential available, sending without Authorization"),
        }

        let response = request.send().await.map_err(map_reqwest)?;

        self.handle_response(response).await
    }

    /// Handle a response, parsing the body or error.
    async fn handle_response<R: DeserializeOwned>(&self, response: reqwest::Response) -> Result<R> {
        let status = response.status();
        trace!(status = %status, "response");

        if status.is_success() {
            response.json::<R>().await.map_err(map_reqwest)
        } else {
            Err(Error::Api(self.parse_error_response(response).await))
        }
    }

    /// Parse an error response. Bodies that are not JSON carry no detail.
    async fn parse_error_response(&self, response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(body) => ApiError::new(status, body.message()),
            Err(_) => ApiError::new(status, None),
        }
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base)
            .field("credentials", &"[REDACTED]")
            .finish()
    }
}
