//! Error type for the deduplicator.

use thiserror::Error;

/// Errors raised while classifying an incoming document against the index.
///
/// A candidate-fetch failure is not itself fatal to ingest: callers should
/// log [`DedupError::CandidateFetch`] and fall back to treating the
/// document as non-matching, not abort the whole run.
#[derive(Debug, Error)]
pub enum DedupError {
    #[error("invalid dedup configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to fetch match candidates from the index: {0}")]
    CandidateFetch(#[from] index::IndexError),

    #[error("failed to compare fuzzy hashes: {0}")]
    FuzzyCompare(#[from] hasher::HashingError),
}
