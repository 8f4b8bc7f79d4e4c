//! Error types for the hearth toolkit.
//!
//! This module provides a unified error type with explicit variants for
//! transport, identity API, storage, and input validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for hearth operations.
///
/// This error type covers all possible failure modes in the toolkit,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, malformed body).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-success responses from the identity API.
    #[error("identity API error: {0}")]
    Api(#[from] ApiError),

    /// Durable token storage errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input validation errors (invalid URL, empty token).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Another login, signup or revalidation attempt is still running.
    #[error("an authentication attempt is already in flight")]
    AttemptInFlight,
}

impl Error {
    /// Returns the message to show the user for a failed attempt.
    ///
    /// The server-supplied `detail` wins when there is one; anything else
    /// (transport failures, bodies without a detail) falls back to
    /// `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Error::Api(err) => err
                .detail
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string()),
            _ => fallback.to_string(),
        }
    }

    /// Returns true if the identity API rejected the request's credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Api(err) if err.is_unauthorized())
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Response body could not be decoded.
    #[error("invalid response body: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// A non-success response from the identity API.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Human-readable `detail` from the response body, if present.
    pub detail: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, detail: Option<String>) -> Self {
        Self { status, detail }
    }

    /// Check if the server rejected the bearer token or the credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Durable storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing store failed.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// The backing store holds data that cannot be parsed.
    #[error("corrupt storage at {path}: {message}")]
    Corrupt { path: String, message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// An empty bearer token was offered to the credential store.
    #[error("token must not be empty")]
    EmptyToken,

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
