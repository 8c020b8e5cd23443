//! Error type for reading and writing canonical-file artifacts.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write artifact at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact header at {path}: {reason}")]
    MalformedHeader { path: PathBuf, reason: String },

    #[error("artifact is missing the '---' header/body separator")]
    MissingSeparator,
}
