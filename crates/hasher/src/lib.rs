//! Hashing primitives for the document canonicalization engine.
//!
//! Four distinct hashes feed the duplicate-detection pipeline, each tuned
//! for a different notion of "the same":
//!
//! - [`file_hash`] / [`file_hash_bytes`]: byte-identical source files.
//! - [`content_hash`]: canonically-equivalent text, independent of the
//!   original file bytes (delegates entirely to the `canonical` crate).
//! - [`fuzzy_hash`] / [`fuzzy_compare`]: near-duplicate text, tolerant of
//!   small insertions, deletions, and OCR noise.
//! - [`per_page_hashes`]: byte-identical pages, used to detect partial
//!   overlap between documents that are not full duplicates of each other.
//!
//! None of these hashes are interchangeable: a fuzzy-hash similarity score
//! says nothing about whether two documents share a page, and a shared page
//! hash says nothing about overall document similarity.

mod content;
mod error;
mod file;
mod fuzzy;

pub use crate::content::content_hash;
pub use crate::error::HashingError;
pub use crate::file::{file_hash, file_hash_bytes, per_page_hashes, PageHash};
pub use crate::fuzzy::{fuzzy_compare, fuzzy_hash};
