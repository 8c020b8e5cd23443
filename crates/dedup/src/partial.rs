//! Partial-overlap detection.
//!
//! Runs independently of the first-match-wins canonical-attachment scan:
//! an incoming document can be a brand-new canonical *and* still partially
//! overlap an unrelated existing one.

use std::collections::HashSet;

use index::{CanonicalId, Store};

use crate::config::DedupConfig;
use crate::error::DedupError;
use crate::types::{IncomingDocument, PartialOverlapCandidate};

/// Compare `incoming`'s per-page hashes against every canonical sharing at
/// least one page hash, returning one [`PartialOverlapCandidate`] per pair
/// whose overlap falls in `(partial_overlap_min, partial_overlap_max)` on
/// either side.
///
/// `exclude` is the canonical id `incoming` is being attached to in this
/// same ingest (if any) — comparing a document against the canonical it is
/// itself becoming a source of is not a partial overlap, it's identity.
pub fn find_partial_overlaps(
    store: &Store,
    incoming: &IncomingDocument,
    exclude: Option<&CanonicalId>,
    cfg: &DedupConfig,
) -> Result<Vec<PartialOverlapCandidate>, DedupError> {
    if incoming.source.per_page_hashes.is_empty() {
        return Ok(Vec::new());
    }

    let incoming_pages: HashSet<&str> = incoming
        .source
        .per_page_hashes
        .iter()
        .map(String::as_str)
        .collect();

    let mut candidate_ids: HashSet<CanonicalId> = HashSet::new();
    for page_hash in &incoming.source.per_page_hashes {
        for id in store.candidates_by_page_hash(page_hash)? {
            candidate_ids.insert(id);
        }
    }
    if let Some(exclude) = exclude {
        candidate_ids.remove(exclude);
    }

    let mut overlaps = Vec::new();
    for candidate_id in candidate_ids {
        let Some(candidate) = store.get_canonical(&candidate_id)? else {
            continue;
        };
        if candidate.per_page_hashes.is_empty() {
            continue;
        }
        let other_pages: HashSet<&str> =
            candidate.per_page_hashes.iter().map(String::as_str).collect();
        let shared = incoming_pages.intersection(&other_pages).count();
        if shared == 0 {
            continue;
        }
        let overlap_incoming = shared as f64 / incoming_pages.len() as f64;
        let overlap_other = shared as f64 / other_pages.len() as f64;

        let in_window = |p: f64| p > cfg.partial_overlap_min && p < cfg.partial_overlap_max;
        if in_window(overlap_incoming) || in_window(overlap_other) {
            overlaps.push(PartialOverlapCandidate {
                other_canonical_id: candidate_id,
                overlap_percentage_incoming: overlap_incoming,
                overlap_percentage_other: overlap_other,
                pages_incoming: incoming
                    .source
                    .pages
                    .clone()
                    .unwrap_or_else(|| format!("1-{}", incoming.source.per_page_hashes.len())),
                pages_other: candidate
                    .primary_source
                    .pages
                    .clone()
                    .unwrap_or_else(|| format!("1-{}", candidate.per_page_hashes.len())),
            });
        }
    }
    Ok(overlaps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use index::{DocumentSource, SourceAuthority, SourceFormat};
    use metadata::{DocumentType, MetadataFields, MetadataRecord};
    use quality::Completeness;
    use tempfile::tempdir;

    fn source(file_hash: &str, pages: Vec<String>) -> DocumentSource {
        DocumentSource {
            source_name: "archive.org".to_string(),
            source_url: None,
            collection: "batch-1".to_string(),
            download_date: Utc::now(),
            pages: Some(format!("1-{}", pages.len())),
            file_path: format!("/in/{file_hash}.pdf"),
            quality_score: 0.9,
            file_size: 2048,
            format: SourceFormat::Pdf,
            authority: SourceAuthority::Archive,
            redaction_count: 0,
            has_redactions: false,
            ocr_quality: 0.9,
            completeness: Completeness::Complete,
            page_count: pages.len() as u32,
            file_hash: file_hash.to_string(),
            content_hash: format!("content-{file_hash}"),
            fuzzy_hash: "3:aaaa:aaaa".to_string(),
            per_page_hashes: pages,
        }
    }

    #[test]
    fn detects_overlap_matching_scenario_s4() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("index.redb")).unwrap();

        let pages_b: Vec<String> = vec!["h4", "h5", "h6", "h7"]
            .into_iter()
            .map(String::from)
            .collect();
        let source_b = source("file-b", pages_b.clone());
        let doc_b = index::CanonicalDocument {
            canonical_id: "content-file-b".to_string(),
            content_hash: source_b.content_hash.clone(),
            file_hash: source_b.file_hash.clone(),
            document_type: DocumentType::Other,
            title: None,
            date: None,
            metadata_fields: metadata::MetadataFields::None,
            ocr_quality: source_b.ocr_quality,
            has_redactions: false,
            completeness: Completeness::Complete,
            page_count: source_b.page_count,
            primary_source: source_b.clone(),
            selection_reason: "only source".to_string(),
            sources: vec![source_b.clone()],
            fuzzy_hash: source_b.fuzzy_hash.clone(),
            per_page_hashes: pages_b,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let log = index::ProcessingLogEntry {
            timestamp: Utc::now(),
            operation: "ingest".to_string(),
            source: "archive.org".to_string(),
            status: index::LogStatus::Ok,
            message: "new canonical".to_string(),
            details_json: serde_json::json!({}),
        };
        store.commit_new_canonical(&doc_b, None, &log).unwrap();

        let pages_a: Vec<String> = vec!["h1", "h2", "h3", "h4", "h5"]
            .into_iter()
            .map(String::from)
            .collect();
        let incoming = IncomingDocument {
            source: source("file-a", pages_a),
            metadata: MetadataRecord {
                document_type: DocumentType::Other,
                title: None,
                date: None,
                fields: MetadataFields::None,
            },
            normalized_text: String::new(),
        };

        let overlaps =
            find_partial_overlaps(&store, &incoming, None, &DedupConfig::default()).unwrap();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].overlap_percentage_incoming, 0.4);
        assert_eq!(overlaps[0].overlap_percentage_other, 0.5);
    }
}
