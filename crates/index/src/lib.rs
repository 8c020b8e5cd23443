//! Persistent relational index for the document canonicalization engine
//!: one `redb` file holding every `CanonicalDocument`, its
//! `DocumentSource` occurrences, detected duplicate/overlap relationships,
//! and the append-only processing log.

mod error;
mod store;
mod types;

pub use crate::error::IndexError;
pub use crate::store::Store;
pub use crate::types::{
    CanonicalDocument, CanonicalId, DetectionMethod, DocumentSource, DuplicateGroup,
    DuplicateType, LogStatus, PartialOverlap, ProcessingLogEntry, SourceAuthority, SourceFormat,
};
