//! hearth - Client-side authentication session manager
//!
//! Tracks who is signed in to the family-task API. A [`CredentialStore`]
//! owns the persisted bearer token and supplies it to outbound requests;
//! a [`SessionManager`] turns login, signup, logout and revalidation
//! intents into [`Session`] snapshots the UI renders.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use hearth::{CredentialStore, SessionManager, SessionStatus};
//! use hearth_core::{ApiUrl, MemoryTokenStorage};
//! use hearth_http::HttpIdentityApi;
//!
//! # async fn example() -> Result<(), hearth::Error> {
//! let store = Arc::new(CredentialStore::new(Arc::new(MemoryTokenStorage::new())));
//! let api = HttpIdentityApi::new(ApiUrl::default(), store.clone())?;
//! let manager = SessionManager::start(api, store).await;
//!
//! let session = manager.login("ada@example.com", "hunter22").await?;
//! match session.status() {
//!     SessionStatus::Authenticated => println!("Welcome {}", session.user.unwrap().full_name()),
//!     _ => println!("{}", session.error.unwrap_or_default()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod session;

pub use auth::CredentialStore;
pub use hearth_core::Error;
pub use session::{AuthAction, Session, SessionManager, SessionStatus, reduce};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
