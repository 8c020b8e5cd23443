//! Error type for the read-only query surface.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("index store error: {0}")]
    Store(#[from] index::IndexError),

    #[error("canonical document {0} not found")]
    NotFound(String),

    #[error("failed writing export to {path}: {source}")]
    ExportWrite {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed encoding export row: {0}")]
    ExportEncode(String),
}
