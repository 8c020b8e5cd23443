//! Error type for canonical-version selection.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("invalid selector configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot select a primary source from an empty source list")]
    NoSources,
}
