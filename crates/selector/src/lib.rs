//! Canonical-version selection: scores every source attached
//! to a canonical and deterministically picks one as primary.

mod config;
mod error;

pub use crate::config::SelectorConfig;
pub use crate::error::SelectorError;

use index::{DocumentSource, SourceAuthority};
use quality::Completeness;

/// Score one source under the weighted selection formula.
pub fn score(source: &DocumentSource, cfg: &SelectorConfig) -> f64 {
    let redaction_term = if !source.has_redactions {
        1.0
    } else {
        (1.0 - cfg.redaction_penalty_per_marker * source.redaction_count as f64).max(0.0)
    };
    let completeness_term = match source.completeness {
        Completeness::Complete => 1.0,
        Completeness::Partial => 0.5,
        Completeness::Fragment => 0.0,
    };

    cfg.ocr_quality_weight * source.ocr_quality
        + cfg.redaction_weight * redaction_term
        + cfg.completeness_weight * completeness_term
        + cfg.authority_weight * source.authority.weight()
        + cfg.file_quality_weight * source.quality_score
}

/// Pick the index of the winning source among `sources` and build its
/// `selection_reason`. Deterministic regardless of `sources`' order: ties
/// within `1e-6` are broken by (a) higher authority bucket, (b) larger
/// `file_size`, (c) lexicographically smallest `source_name`.
pub fn select_primary(
    sources: &[DocumentSource],
    cfg: &SelectorConfig,
) -> Result<(usize, String), SelectorError> {
    if sources.is_empty() {
        return Err(SelectorError::NoSources);
    }

    let mut best_idx = 0;
    let mut best_score = score(&sources[0], cfg);
    for (idx, candidate) in sources.iter().enumerate().skip(1) {
        let candidate_score = score(candidate, cfg);
        if is_better(candidate, candidate_score, &sources[best_idx], best_score) {
            best_idx = idx;
            best_score = candidate_score;
        }
    }

    Ok((best_idx, selection_reason(&sources[best_idx], best_score)))
}

/// `true` if `candidate` should replace `current` as the selected primary.
fn is_better(
    candidate: &DocumentSource,
    candidate_score: f64,
    current: &DocumentSource,
    current_score: f64,
) -> bool {
    let diff = candidate_score - current_score;
    if diff.abs() > 1e-6 {
        return diff > 0.0;
    }
    if candidate.authority != current.authority {
        return candidate.authority > current.authority;
    }
    if candidate.file_size != current.file_size {
        return candidate.file_size > current.file_size;
    }
    candidate.source_name < current.source_name
}

fn selection_reason(source: &DocumentSource, score: f64) -> String {
    let mut reasons = Vec::new();
    if source.has_redactions {
        reasons.push(format!("{} redaction marker(s) found", source.redaction_count));
    } else {
        reasons.push("No redactions".to_string());
    }
    match source.completeness {
        Completeness::Complete => reasons.push("Complete document".to_string()),
        Completeness::Partial => reasons.push("Partial document (gaps in page sequence)".to_string()),
        Completeness::Fragment => reasons.push("Fragment (short excerpt)".to_string()),
    }
    if source.ocr_quality >= 0.90 {
        reasons.push("High OCR quality".to_string());
    } else if source.ocr_quality >= 0.70 {
        reasons.push("Acceptable OCR quality".to_string());
    } else {
        reasons.push("Low OCR quality".to_string());
    }
    reasons.push(format!("authority={:?}", source.authority));

    format!(
        "selected '{}' (score={:.4}): {}",
        source.source_name,
        score,
        reasons.join("; "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use index::SourceFormat;

    fn source(name: &str, ocr_quality: f64, authority: SourceAuthority, file_size: u64) -> DocumentSource {
        DocumentSource {
            source_name: name.to_string(),
            source_url: None,
            collection: "batch-1".to_string(),
            download_date: Utc::now(),
            pages: None,
            file_path: format!("/in/{name}.pdf"),
            quality_score: 0.8,
            file_size,
            format: SourceFormat::Pdf,
            authority,
            redaction_count: 0,
            has_redactions: false,
            ocr_quality,
            completeness: Completeness::Complete,
            page_count: 1,
            file_hash: format!("hash-{name}"),
            content_hash: "shared-content".to_string(),
            fuzzy_hash: "3:aaaa:aaaa".to_string(),
            per_page_hashes: vec![],
        }
    }

    #[test]
    fn higher_ocr_quality_wins() {
        let cfg = SelectorConfig::default();
        let sources = vec![
            source("low", 0.5, SourceAuthority::Archive, 1000),
            source("high", 0.95, SourceAuthority::Archive, 1000),
        ];
        let (idx, reason) = select_primary(&sources, &cfg).unwrap();
        assert_eq!(idx, 1);
        assert!(reason.contains("high"));
    }

    #[test]
    fn redactions_penalize_score() {
        let cfg = SelectorConfig::default();
        let mut redacted = source("redacted", 0.9, SourceAuthority::Archive, 1000);
        redacted.has_redactions = true;
        redacted.redaction_count = 5;
        let clean = source("clean", 0.9, SourceAuthority::Archive, 1000);
        let sources = vec![redacted, clean];
        let (idx, _) = select_primary(&sources, &cfg).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn tie_break_prefers_higher_authority_then_file_size_then_name() {
        let cfg = SelectorConfig::default();
        let a = source("zeta", 0.9, SourceAuthority::Archive, 1000);
        let b = source("alpha", 0.9, SourceAuthority::CourtRecord, 1000);
        let sources = vec![a, b.clone()];
        let (idx, _) = select_primary(&sources, &cfg).unwrap();
        assert_eq!(sources[idx].source_name, "alpha");

        let c = source("beta", 0.9, SourceAuthority::CourtRecord, 500);
        let sources2 = vec![b, c];
        let (idx2, _) = select_primary(&sources2, &cfg).unwrap();
        assert_eq!(sources2[idx2].source_name, "alpha");
    }

    #[test]
    fn selection_is_order_independent() {
        let cfg = SelectorConfig::default();
        let a = source("a", 0.9, SourceAuthority::Media, 1000);
        let b = source("b", 0.95, SourceAuthority::GovernmentFoia, 2000);
        let c = source("c", 0.7, SourceAuthority::Other, 500);

        let forward = vec![a.clone(), b.clone(), c.clone()];
        let backward = vec![c, b, a];

        let (idx_forward, reason_forward) = select_primary(&forward, &cfg).unwrap();
        let (idx_backward, reason_backward) = select_primary(&backward, &cfg).unwrap();

        assert_eq!(forward[idx_forward].source_name, "b");
        assert_eq!(backward[idx_backward].source_name, "b");
        assert_eq!(reason_forward, reason_backward);
    }
}
