//! Error type for batch directory ingest.

use thiserror::Error;

/// Errors raised by [`crate::process_directory`].
///
/// Most failure kinds are recovered per-file and only surfaced in the
/// [`crate::Report`]; the variants here are the ones that are fatal to the
/// whole run (store/config/lock failures). A cancelled run is not an error
/// at all — it still returns `Ok(Report)`, with `status` set to
/// [`crate::RunStatus::Aborted`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source directory does not exist or is not readable: {0}")]
    SourceDirUnreadable(std::path::PathBuf),

    #[error("index store error: {0}")]
    Store(#[from] index::IndexError),

    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// Store contention exhausted its retry budget: retried with
    /// exponential backoff up to the configured attempt limit, then the
    /// batch aborts rather than dropping the write silently.
    #[error("store write failed after {attempts} retries: {source}")]
    StoreContentionExhausted {
        attempts: u32,
        #[source]
        source: index::IndexError,
    },
}

/// One per-file failure, recorded in the [`crate::Report`] rather than
/// aborting the batch.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct FileError {
    pub file_path: String,
    pub kind: FileErrorKind,
    pub message: String,
}

/// Classification of a recovered per-file error, so the final report can
/// break counts down by kind.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FileErrorKind {
    Io,
    Hashing,
    Dedup,
    Selection,
    IntegrityViolation,
    Timeout,
    Artifact,
}

/// Outcome of one [`crate::ingest::commit_file`] call: either a per-file
/// failure the batch recovers from, or a fatal condition that aborts the
/// whole run.
#[derive(Debug)]
pub enum CommitError {
    File(FileError),
    Fatal(PipelineError),
}

impl From<FileError> for CommitError {
    fn from(e: FileError) -> Self {
        CommitError::File(e)
    }
}
