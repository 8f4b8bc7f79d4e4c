//! The credential store: sole owner of the persisted bearer token.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, instrument, warn};

use hearth_core::error::InvalidInputError;
use hearth_core::{AccessToken, CredentialProvider, Result, TokenStorage};

/// Holds the single bearer token in durable storage and supplies it to
/// outbound requests.
///
/// The store keeps two copies in step: the durable entry, which survives
/// restarts, and the in-memory credential handed to the request layer
/// through [`CredentialProvider`]. Nothing else writes either.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use hearth::CredentialStore;
/// use hearth_core::{AccessToken, CredentialProvider, MemoryTokenStorage};
///
/// let store = CredentialStore::new(Arc::new(MemoryTokenStorage::new()));
/// store.set_token(&AccessToken::new("T")).unwrap();
/// assert_eq!(store.authorization().as_deref(), Some("Bearer T"));
///
/// store.clear_token().unwrap();
/// assert!(store.get_token().is_none());
/// ```
pub struct CredentialStore {
    storage: Arc<dyn TokenStorage>,
    header: RwLock<Option<AccessToken>>,
}

impl CredentialStore {
    /// Create a store over `storage`. Call [`CredentialStore::initialize`]
    /// once at startup to pick up a token persisted by an earlier run.
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            storage,
            header: RwLock::new(None),
        }
    }

    /// Re-apply a previously persisted token to outbound requests.
    ///
    /// Returns the restored token, or `None` when nothing was persisted.
    #[instrument(skip(self))]
    pub fn initialize(&self) -> Option<AccessToken> {
        let token = self.get_token();
        debug!(restored = token.is_some(), "Initializing credential store");
        self.set_header(token.clone());
        token
    }

    /// Read the persisted token.
    ///
    /// Never fails: a storage error is logged and reported as no token.
    pub fn get_token(&self) -> Option<AccessToken> {
        match self.storage.load() {
            Ok(token) => token.filter(|t| !t.is_empty()).map(AccessToken::new),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token");
                None
            }
        }
    }

    /// Persist `token` and attach it to every subsequent request.
    ///
    /// # Errors
    ///
    /// Rejects an empty token. If the durable write fails, the request
    /// credential is left as it was.
    #[instrument(skip_all)]
    pub fn set_token(&self, token: &AccessToken) -> Result<()> {
        if token.is_empty() {
            return Err(InvalidInputError::EmptyToken.into());
        }

        self.storage.store(token.as_str())?;
        self.set_header(Some(token.clone()));
        debug!("Token stored");
        Ok(())
    }

    /// Remove the persisted token and stop attaching it to requests.
    ///
    /// Idempotent. The request credential is stripped even when the
    /// durable removal fails.
    #[instrument(skip(self))]
    pub fn clear_token(&self) -> Result<()> {
        self.set_header(None);
        self.storage.remove()?;
        debug!("Token cleared");
        Ok(())
    }

    /// Returns true if a token is currently attached to requests.
    pub fn has_credential(&self) -> bool {
        self.header
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn set_header(&self, token: Option<AccessToken>) {
        *self.header.write().unwrap_or_else(PoisonError::into_inner) = token;
    }
}

impl CredentialProvider for CredentialStore {
    fn access_token(&self) -> Option<AccessToken> {
        self.header
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("has_credential", &self.has_credential())
            .finish()
    }
}
