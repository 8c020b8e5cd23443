//! Error types for the index store.

use thiserror::Error;

/// Errors raised by [`crate::Store`].
#[derive(Debug, Error)]
pub enum IndexError {
    /// The backing `redb` file could not be opened, read, or written.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A record could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Another process already holds the exclusive lock on this store.
    #[error("store at {path} is already locked by another process")]
    AlreadyLocked { path: String },

    /// A commit would have broken one of the store's entity invariants
    /// (duplicate content hash, dangling reference, out-of-range score, ...).
    /// The commit is refused; the store is left unchanged.
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),
}

impl IndexError {
    pub(crate) fn backend(msg: impl std::fmt::Display) -> Self {
        IndexError::Backend(msg.to_string())
    }

    pub(crate) fn encoding(msg: impl std::fmt::Display) -> Self {
        IndexError::Encoding(msg.to_string())
    }
}
