//! Error types for the hashing stage.

use thiserror::Error;

/// Errors produced while computing file, content, fuzzy, or per-page hashes.
#[derive(Debug, Error)]
pub enum HashingError {
    /// Reading the source (file, page, or byte slice) failed.
    #[error("failed to read input for hashing: {0}")]
    Read(#[from] std::io::Error),

    /// The input had no bytes to hash.
    #[error("cannot hash empty input")]
    EmptyInput,

    /// Downstream canonicalization failed while computing a content hash.
    #[error("canonicalization failed: {0}")]
    Canonical(#[from] canonical::CanonicalError),

    /// A fuzzy-hash signature string could not be parsed.
    #[error("malformed fuzzy hash signature: {0}")]
    MalformedSignature(String),

    /// Two fuzzy hashes could not be compared (incompatible block sizes).
    #[error("fuzzy hashes are not comparable: block sizes {0} and {1} share no common scale")]
    IncomparableBlockSizes(u32, u32),
}
