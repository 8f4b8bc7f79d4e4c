//! Token persistence and request credentials.
//!
//! The [`CredentialStore`] is the only writer of the persisted bearer
//! token and the only source of the `Authorization` header.

mod store;

pub use store::CredentialStore;
