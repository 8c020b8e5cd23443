//! Types shared by the deduplication strategies.

use index::{CanonicalId, DetectionMethod, DocumentSource, DuplicateType};
use metadata::MetadataRecord;

/// A fully-hashed, quality-assessed, metadata-extracted document awaiting a
/// dedup decision. Everything a strategy needs is either already in
/// `source` (hashes, quality, authority) or derivable from `metadata` and
/// `normalized_text`.
#[derive(Debug, Clone)]
pub struct IncomingDocument {
    pub source: DocumentSource,
    pub metadata: MetadataRecord,
    /// Canonicalized text, used for the fuzzy strategy's text-similarity
    /// fallback. Only the leading `DedupConfig::text_similarity_chars` of
    /// this are ever compared.
    pub normalized_text: String,
}

/// The first-match-wins strategy order, modeled as data so it is a `Vec` a
/// caller can inspect or reorder in tests rather than a hardcoded
/// `if`-chain. `Partial` is never part of the first-match-wins scan; it
/// names the orthogonal pass run after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchExpr {
    Exact,
    Metadata,
    Fuzzy { min_score: f64 },
    Partial,
}

/// The default first-match-wins order for canonical attachment.
pub fn default_strategy_order(cfg: &crate::config::DedupConfig) -> Vec<MatchExpr> {
    let mut order = vec![MatchExpr::Exact, MatchExpr::Metadata];
    if !cfg.skip_fuzzy {
        order.push(MatchExpr::Fuzzy {
            min_score: cfg.fuzzy_threshold,
        });
    }
    order
}

/// Outcome of classifying one [`IncomingDocument`] against the index.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// No strategy matched; the document becomes its own canonical.
    NewCanonical,
    /// Attach as an additional source of an existing canonical.
    AttachExisting {
        canonical_id: CanonicalId,
        duplicate_type: DuplicateType,
        similarity_score: f64,
        detection_method: DetectionMethod,
    },
}

/// One detected partial-overlap relationship, ready to become a
/// [`index::PartialOverlap`] row once the incoming document's own
/// canonical id is known.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialOverlapCandidate {
    pub other_canonical_id: CanonicalId,
    pub overlap_percentage_incoming: f64,
    pub overlap_percentage_other: f64,
    pub pages_incoming: String,
    pub pages_other: String,
}
