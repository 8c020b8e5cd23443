//! Low-level building blocks for each of the four matching strategies.
//! Orchestrated into the first-match-wins order by [`crate::classify`].

use std::collections::HashMap;

use hasher::fuzzy_compare;
use index::{CanonicalDocument, CanonicalId, DetectionMethod, Store};

use crate::config::DedupConfig;
use crate::error::DedupError;
use crate::similarity::text_similarity;
use crate::types::IncomingDocument;

/// Step 1/2: exact matches by file hash and by content hash.
///
/// Returns `(by_file, by_content)`. If both are `Some` but disagree, the
/// caller should prefer `by_content` and log a warning — that decision is
/// made one level up in [`crate::classify`], which is why both results are
/// surfaced here rather than collapsed.
pub fn lookup_exact(
    store: &Store,
    incoming: &IncomingDocument,
) -> Result<(Option<CanonicalId>, Option<CanonicalId>), DedupError> {
    let by_file = store.lookup_by_file_hash(&incoming.source.file_hash)?;
    let by_content = store.lookup_by_content_hash(&incoming.source.content_hash)?;
    Ok((by_file, by_content))
}

/// Step 3: metadata-signature match, emails only.
pub fn lookup_metadata(
    store: &Store,
    incoming: &IncomingDocument,
) -> Result<Option<CanonicalId>, DedupError> {
    let Some(signature) = metadata::metadata_signature(&incoming.metadata) else {
        return Ok(None);
    };
    let key = serde_json::to_string(&signature).unwrap_or_default();
    Ok(store.lookup_by_metadata_sig(&key)?)
}

/// The exact key the metadata strategy's index row would be written under
/// for `incoming`, or `None` if it carries no email signature.
pub fn metadata_sig_key(incoming: &IncomingDocument) -> Option<String> {
    metadata::metadata_signature(&incoming.metadata).map(|sig| serde_json::to_string(&sig).unwrap_or_default())
}

/// Step 4: best fuzzy/text-similarity match among prefix-filtered
/// candidates.
///
/// `candidate_text` supplies cached normalized text for canonicals the
/// pipeline has already read (e.g. via the artifact writer), keyed by
/// `canonical_id`; candidates missing from the map are scored on
/// `fuzzy_hash` alone. This keeps the deduplicator from depending on the
/// artifact storage layer directly.
pub fn best_fuzzy_match(
    store: &Store,
    incoming: &IncomingDocument,
    candidate_text: &HashMap<CanonicalId, String>,
    cfg: &DedupConfig,
) -> Result<Option<(CanonicalDocument, f64, DetectionMethod)>, DedupError> {
    let candidates = fuzzy_candidates(store, &incoming.source.fuzzy_hash)?;

    let mut best: Option<(CanonicalDocument, f64, DetectionMethod)> = None;
    for candidate in candidates {
        let fuzzy_score = fuzzy_compare(&incoming.source.fuzzy_hash, &candidate.fuzzy_hash)
            .map(|score| score as f64 / 100.0)
            .unwrap_or(0.0);
        let text_score = candidate_text
            .get(&candidate.canonical_id)
            .map(|text| text_similarity(&incoming.normalized_text, text, cfg.text_similarity_chars))
            .unwrap_or(0.0);

        let (score, method) = if fuzzy_score >= text_score {
            (fuzzy_score, DetectionMethod::FuzzyHash)
        } else {
            (text_score, DetectionMethod::TextDiff)
        };

        if best.as_ref().map(|(_, best_score, _)| score > *best_score).unwrap_or(true) {
            best = Some((candidate, score, method));
        }
    }
    Ok(best)
}

/// Canonicals whose fuzzy hash was computed at the same block size as
/// `fuzzy_hash`, or at half/double that block size — the only scales
/// `ssdeep`-style comparison ever finds comparable.
///
/// Exposed beyond this module so a caller that has somewhere durable to
/// recover a candidate's text from (e.g. a canonical-file artifact store)
/// can populate [`best_fuzzy_match`]'s `candidate_text` cache for exactly
/// the candidates that will actually be scored, rather than every
/// canonical in the index.
pub fn fuzzy_candidates(
    store: &Store,
    fuzzy_hash: &str,
) -> Result<Vec<CanonicalDocument>, DedupError> {
    let Some(blocksize) = parse_blocksize(fuzzy_hash) else {
        return Ok(Vec::new());
    };
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    let mut scales = vec![blocksize];
    if blocksize > 1 {
        scales.push(blocksize / 2);
    }
    scales.push(blocksize.saturating_mul(2));

    for scale in scales {
        if scale == 0 {
            continue;
        }
        for doc in store.candidates_by_fuzzy_blocksize(scale)? {
            if seen.insert(doc.canonical_id.clone()) {
                out.push(doc);
            }
        }
    }
    Ok(out)
}

fn parse_blocksize(fuzzy_hash: &str) -> Option<u32> {
    fuzzy_hash.split(':').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_blocksize_reads_leading_number() {
        assert_eq!(parse_blocksize("96:abc:def"), Some(96));
        assert_eq!(parse_blocksize("garbage"), None);
    }
}
