//! Entity types stored by the index.
//!
//! Every entity here maps to one `redb` table in [`crate::store`]; nothing
//! is folded into an opaque blob column, so every lookup the store exposes
//! is a direct table read rather than a deserialize-then-filter scan.

use chrono::{DateTime, Utc};
use metadata::{DocumentType, MetadataFields};
use quality::Completeness;
use serde::{Deserialize, Serialize};

/// Stable identifier for a [`CanonicalDocument`]: its `content_hash`.
///
/// Using the content hash itself as the identifier (rather than a
/// separately-allocated counter or UUID) means the same logical document
/// always gets the same id regardless of ingest order, which is what
/// order-independent final store contents require.
pub type CanonicalId = String;

/// Trust bucket of a [`DocumentSource`], used by the canonical selector.
/// Ordered so that `SourceAuthority::CourtRecord > ... >
/// SourceAuthority::Other`; when a source belongs to more than one category,
/// callers should supply the highest applicable bucket (see `DESIGN.md`,
/// Open Question 2).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceAuthority {
    Other,
    Archive,
    Media,
    OfficialRelease,
    GovernmentFoia,
    CourtRecord,
}

impl SourceAuthority {
    /// Weight used in the selector's score formula.
    pub fn weight(self) -> f64 {
        match self {
            SourceAuthority::CourtRecord => 1.0,
            SourceAuthority::GovernmentFoia => 0.8,
            SourceAuthority::OfficialRelease => 0.6,
            SourceAuthority::Media => 0.4,
            SourceAuthority::Archive => 0.2,
            SourceAuthority::Other => 0.0,
        }
    }
}

/// Container format of a [`DocumentSource`]'s file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Pdf,
    Txt,
    Markdown,
    Docx,
    Other,
}

/// One observed occurrence of a canonical document in an input collection.
///
/// `quality_score`/`file_size`/`format` are intrinsic to this occurrence,
/// while `ocr_quality`/`has_redactions`/`completeness` are also mirrored
/// onto the owning `CanonicalDocument`. The selector scores *per source*,
/// and re-selection must be able to compare sources whose quality differs, so
/// those fields — along with each source's own hash set — live here; the
/// `CanonicalDocument`-level copies are kept in sync with whichever source
/// is currently primary. See `DESIGN.md`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSource {
    pub source_name: String,
    pub source_url: Option<String>,
    pub collection: String,
    pub download_date: DateTime<Utc>,
    /// Page range, e.g. `"1-5"`; `None` when not meaningfully paginated.
    pub pages: Option<String>,
    pub file_path: String,
    pub quality_score: f64,
    pub file_size: u64,
    pub format: SourceFormat,
    pub authority: SourceAuthority,
    /// How many redaction markers this specific source's text contained,
    /// used by the selector's redaction penalty term.
    pub redaction_count: u32,
    pub has_redactions: bool,
    pub ocr_quality: f64,
    pub completeness: Completeness,
    pub page_count: u32,
    pub file_hash: String,
    pub content_hash: String,
    pub fuzzy_hash: String,
    pub per_page_hashes: Vec<String>,
}

/// The representative record for one equivalence class of variants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalDocument {
    pub canonical_id: CanonicalId,
    pub content_hash: String,
    pub file_hash: String,
    pub document_type: DocumentType,
    pub title: Option<String>,
    /// ISO-8601 date, or `None` when undetermined.
    pub date: Option<String>,
    /// Document-type-specific fields (from/to/subject for emails,
    /// case_number/court for filings, amount/transaction_date for
    /// financial records); `MetadataFields::None` otherwise.
    pub metadata_fields: MetadataFields,
    pub ocr_quality: f64,
    pub has_redactions: bool,
    pub completeness: Completeness,
    pub page_count: u32,
    pub primary_source: DocumentSource,
    pub selection_reason: String,
    pub sources: Vec<DocumentSource>,
    pub fuzzy_hash: String,
    pub per_page_hashes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How a duplicate was detected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateType {
    Exact,
    Fuzzy,
    Metadata,
    Partial,
}

/// The specific strategy that produced a [`DuplicateGroup`] row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    FileHash,
    ContentHash,
    FuzzyHash,
    TextDiff,
    MetadataSig,
    PageOverlap,
}

/// A detected equivalence relation between a new source and an existing
/// canonical. Append-only: existing rows are never modified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateGroup {
    pub canonical_id: CanonicalId,
    pub duplicate_type: DuplicateType,
    pub similarity_score: f64,
    pub detection_method: DetectionMethod,
    pub detected_at: DateTime<Utc>,
}

/// A directed-pair annotation between two canonicals sharing a proper page
/// subset. Never merges canonicals; append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartialOverlap {
    pub doc_a_id: CanonicalId,
    pub doc_b_id: CanonicalId,
    pub overlap_percentage_a: f64,
    pub overlap_percentage_b: f64,
    pub pages_a: String,
    pub pages_b: String,
    pub detected_at: DateTime<Utc>,
}

/// Outcome of one processing-log entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Ok,
    Warning,
    Error,
}

/// Append-only audit record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessingLogEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub source: String,
    pub status: LogStatus,
    pub message: String,
    pub details_json: serde_json::Value,
}
