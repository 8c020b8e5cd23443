//! Read-only query surface over the document canonicalization engine's
//! index. Every function here takes a `&Store` and never
//! mutates it; the CLI's `query` subcommand is a thin wrapper over these.

mod duplicates;
mod error;
mod export;
mod quality_band;
mod recent;
mod search;
mod sources;
mod stats;

pub use crate::duplicates::{duplicates, DuplicateSummary};
pub use crate::error::QueryError;
pub use crate::export::{export, ExportFormat, ExportRow};
pub use crate::quality_band::{quality_bands, QualityBand, QualityBandCounts};
pub use crate::recent::recent;
pub use crate::search::search;
pub use crate::sources::sources;
pub use crate::stats::{stats, Stats};
