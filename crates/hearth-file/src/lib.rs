//! hearth-file - Filesystem-backed token storage.

mod store;

pub use store::FileTokenStorage;
