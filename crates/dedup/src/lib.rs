//! Duplicate detection: classifies an incoming document against
//! the persistent index, either as a new canonical or as an additional
//! source of an existing one, and separately flags partial page overlaps.
//!
//! The five-step strategy order (exact file, exact content, metadata,
//! fuzzy, partial) is data (see [`MatchExpr`]) rather than a hardcoded
//! `if`-chain, so each step is independently testable via the functions in
//! [`strategy`].

mod config;
mod error;
mod partial;
mod similarity;
mod strategy;
mod types;

use std::collections::HashMap;

use index::{CanonicalId, DetectionMethod, DuplicateType, Store};

pub use crate::config::DedupConfig;
pub use crate::error::DedupError;
pub use crate::partial::find_partial_overlaps;
pub use crate::strategy::{fuzzy_candidates, metadata_sig_key};
pub use crate::types::{
    default_strategy_order, Classification, IncomingDocument, MatchExpr, PartialOverlapCandidate,
};

/// Result of [`classify`]: the attachment decision plus any warnings the
/// caller should append to the processing log — e.g. the corruption
/// tie-break records a warning when file_hash and content_hash disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct DedupOutcome {
    pub classification: Classification,
    pub warnings: Vec<String>,
}

/// Classify `incoming` against `store`, running the four first-match-wins
/// strategies (exact file, exact content, metadata, fuzzy) in sequence.
/// Does not itself write anything to the store or run the partial-overlap
/// pass — see [`find_partial_overlaps`] for that, and the `index` crate's
/// `commit_*` methods for persistence.
pub fn classify(
    store: &Store,
    incoming: &IncomingDocument,
    candidate_text: &HashMap<CanonicalId, String>,
    cfg: &DedupConfig,
) -> Result<DedupOutcome, DedupError> {
    let mut warnings = Vec::new();

    let (by_file, by_content) = strategy::lookup_exact(store, incoming)?;
    let exact = match (by_file, by_content) {
        (Some(file_id), Some(content_id)) if file_id == content_id => {
            Some((file_id, DetectionMethod::FileHash))
        }
        (Some(file_id), Some(content_id)) => {
            warnings.push(format!(
                "file_hash and content_hash disagree for source '{}': file_hash -> {file_id}, content_hash -> {content_id}; preferring content_hash match (corruption tie-break)",
                incoming.source.source_name
            ));
            Some((content_id, DetectionMethod::ContentHash))
        }
        (Some(file_id), None) => Some((file_id, DetectionMethod::FileHash)),
        (None, Some(content_id)) => Some((content_id, DetectionMethod::ContentHash)),
        (None, None) => None,
    };
    if let Some((canonical_id, detection_method)) = exact {
        return Ok(DedupOutcome {
            classification: Classification::AttachExisting {
                canonical_id,
                duplicate_type: DuplicateType::Exact,
                similarity_score: 1.0,
                detection_method,
            },
            warnings,
        });
    }

    let metadata_match = strategy::lookup_metadata(store, incoming)?;
    let fuzzy_match = if cfg.skip_fuzzy {
        None
    } else {
        strategy::best_fuzzy_match(store, incoming, candidate_text, cfg)?
            .filter(|(_, score, _)| *score >= cfg.fuzzy_threshold)
    };

    let classification = match (metadata_match, fuzzy_match) {
        (Some(_), Some((fuzzy_doc, score, method))) if score > cfg.fuzzy_over_metadata_threshold => {
            Classification::AttachExisting {
                canonical_id: fuzzy_doc.canonical_id,
                duplicate_type: DuplicateType::Fuzzy,
                similarity_score: score,
                detection_method: method,
            }
        }
        (Some(meta_id), _) => Classification::AttachExisting {
            canonical_id: meta_id,
            duplicate_type: DuplicateType::Metadata,
            similarity_score: 0.95,
            detection_method: DetectionMethod::MetadataSig,
        },
        (None, Some((fuzzy_doc, score, method))) => Classification::AttachExisting {
            canonical_id: fuzzy_doc.canonical_id,
            duplicate_type: DuplicateType::Fuzzy,
            similarity_score: score,
            detection_method: method,
        },
        (None, None) => Classification::NewCanonical,
    };

    Ok(DedupOutcome {
        classification,
        warnings,
    })
}
