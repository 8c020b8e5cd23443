//! Error types for the metadata extractor.
//!
//! `extract` itself never fails (see [`crate::extract`]): unparseable input
//! just yields fewer populated fields. [`MetadataError`] exists for the
//! narrower internal helpers that do have a meaningful failure mode, such as
//! strict ISO-8601 date parsing.

use thiserror::Error;

/// Errors raised by the narrower, fallible helpers in this crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// A date-like string could not be parsed into an ISO-8601 date.
    #[error("could not parse {0:?} as a date")]
    UnparseableDate(String),
}
