//! Durable token storage trait and the in-memory backend.

use std::sync::{Mutex, PoisonError};

use crate::Result;

/// Well-known key under which the raw bearer token is persisted.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Durable client storage holding at most one bearer token.
///
/// An absent entry means the client is unauthenticated.
pub trait TokenStorage: Send + Sync {
    /// Read the stored token, if any.
    fn load(&self) -> Result<Option<String>>;

    /// Persist `token`, replacing any previous value.
    fn store(&self, token: &str) -> Result<()>;

    /// Remove the stored token. Removing a missing token succeeds.
    fn remove(&self) -> Result<()>;
}

/// Process-local token storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage that already holds `token`, as if persisted by an
    /// earlier run.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn store(&self, token: &str) -> Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}
