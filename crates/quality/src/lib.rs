//! OCR quality, redaction, and completeness assessment.
//!
//! `assess` takes already-extracted text (OCR output or native PDF/text
//! extraction) and produces a composite quality signal used by the
//! Canonical Selector (higher `ocr_quality` sources are preferred as
//! primary) and surfaced directly in the canonical file header. This crate
//! has no dependency on the canonicalizer: it looks at the text as
//! extracted, including the noise the canonicalizer would otherwise strip,
//! because that noise is exactly what `corruption_score` measures.

mod config;
mod dictionary;
mod error;

pub use crate::config::QualityConfig;
pub use crate::error::QualityError;

use serde::{Deserialize, Serialize};

/// How whole a document appears to be.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Completeness {
    /// No missing-page or truncation signals detected.
    Complete,
    /// Page-number sequence has gaps, suggesting missing pages.
    Partial,
    /// Text is implausibly short or carries an explicit truncation marker.
    Fragment,
}

/// Result of assessing one document's extracted text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityAssessment {
    /// Composite OCR quality score in `[0.0, 1.0]`.
    pub ocr_quality: f64,
    /// Whether the text contains enough redaction markers to flag it.
    pub has_redactions: bool,
    /// Number of distinct redaction markers found, used by the selector's
    /// per-marker redaction penalty.
    pub redaction_count: u32,
    /// Completeness classification.
    pub completeness: Completeness,
    /// Fraction of characters that look like mojibake/corruption.
    pub mojibake_rate: f64,
}

const TRUNCATION_MARKERS: &[&str] = &[
    "[...]",
    "(cont'd)",
    "(continued)",
    "continued on next page",
    "see next page",
];

const REDACTION_BLOCK_CHAR: char = '\u{2588}'; // FULL BLOCK

/// Assess the quality of `text` according to `cfg`.
///
/// `cfg` should already be validated via [`QualityConfig::validate`]; this
/// function does not re-validate it, matching how the rest of this engine
/// treats config validation as a startup-time concern rather than a
/// per-call one.
pub fn assess(text: &str, cfg: &QualityConfig) -> QualityAssessment {
    let word_score = word_score(text, cfg.min_tokens_for_word_score);
    let mojibake_rate = mojibake_rate(text);
    let corruption_score = 1.0 - mojibake_rate;
    let line_score = line_score(text);

    let ocr_quality = (cfg.word_weight * word_score
        + cfg.corruption_weight * corruption_score
        + cfg.line_weight * line_score)
        .clamp(0.0, 1.0);

    let redaction_count = redaction_marker_count(text);
    let has_redactions = redaction_count >= cfg.redaction_marker_threshold;
    let completeness = classify_completeness(text, cfg.fragment_length_threshold);

    QualityAssessment {
        ocr_quality,
        has_redactions,
        redaction_count: redaction_count as u32,
        completeness,
        mojibake_rate,
    }
}

fn word_score(text: &str, min_tokens: usize) -> f64 {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < min_tokens {
        return 0.5;
    }

    let mut known = 0usize;
    let mut counted = 0usize;
    for token in &tokens {
        let cleaned: String = token
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if cleaned.is_empty() {
            continue;
        }
        counted += 1;
        if dictionary::contains(&cleaned) {
            known += 1;
        }
    }

    if counted == 0 {
        0.5
    } else {
        known as f64 / counted as f64
    }
}

fn mojibake_rate(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let total = text.chars().count();
    let corrupt = text
        .chars()
        .filter(|&c| c == '\u{FFFD}' || (c.is_control() && c != '\n' && c != '\r' && c != '\t'))
        .count();
    (corrupt as f64 / total as f64).clamp(0.0, 1.0)
}

fn line_score(text: &str) -> f64 {
    const MAX_PLAUSIBLE_LINE_LEN: usize = 500;

    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return 1.0;
    }
    let plausible = lines
        .iter()
        .filter(|l| !l.is_empty() && l.chars().count() <= MAX_PLAUSIBLE_LINE_LEN)
        .count();
    plausible as f64 / lines.len() as f64
}

fn redaction_marker_count(text: &str) -> usize {
    let lower = text.to_lowercase();
    let mut count = lower.matches("[redacted]").count();

    count += count_char_runs(text, REDACTION_BLOCK_CHAR, 3);
    count += count_char_runs(text, '_', 10);
    count += count_char_runs(text, '-', 10);

    count
}

/// Count maximal runs of `target` at least `min_run` characters long.
fn count_char_runs(text: &str, target: char, min_run: usize) -> usize {
    let mut count = 0;
    let mut run = 0usize;
    for c in text.chars() {
        if c == target {
            run += 1;
        } else {
            if run >= min_run {
                count += 1;
            }
            run = 0;
        }
    }
    if run >= min_run {
        count += 1;
    }
    count
}

/// Scan for "page N" occurrences and report the parsed page numbers, in the
/// order found. Used only to detect gaps, not to reconstruct exact layout.
fn scan_page_numbers(text: &str) -> Vec<u32> {
    let lower = text.to_lowercase();
    let mut numbers = Vec::new();
    let mut search_from = 0usize;
    while let Some(rel) = lower[search_from..].find("page") {
        let start = search_from + rel + "page".len();
        let rest = lower[start..].trim_start();
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(n) = digits.parse::<u32>() {
            numbers.push(n);
        }
        search_from = start;
        if search_from >= lower.len() {
            break;
        }
    }
    numbers
}

fn has_page_gaps(text: &str) -> bool {
    let mut numbers = scan_page_numbers(text);
    if numbers.len() < 2 {
        return false;
    }
    numbers.sort_unstable();
    numbers.dedup();
    let min = *numbers.first().unwrap();
    let max = *numbers.last().unwrap();
    let expected = (max - min + 1) as usize;
    numbers.len() < expected
}

fn classify_completeness(text: &str, fragment_length_threshold: usize) -> Completeness {
    let trimmed = text.trim();
    if trimmed.chars().count() < fragment_length_threshold {
        return Completeness::Fragment;
    }
    let lower = trimmed.to_lowercase();
    if TRUNCATION_MARKERS.iter().any(|m| lower.contains(m)) {
        return Completeness::Fragment;
    }
    if has_page_gaps(text) {
        return Completeness::Partial;
    }
    Completeness::Complete
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_document(paragraphs: usize) -> String {
        "the court reviewed the filing and the judge issued an order regarding the motion. "
            .repeat(paragraphs)
    }

    #[test]
    fn clean_text_scores_high_ocr_quality() {
        let cfg = QualityConfig::default();
        let text = clean_document(20);
        let result = assess(&text, &cfg);
        assert!(result.ocr_quality > 0.7, "got {}", result.ocr_quality);
        assert_eq!(result.completeness, Completeness::Complete);
        assert!(!result.has_redactions);
    }

    #[test]
    fn short_text_uses_neutral_word_score() {
        let cfg = QualityConfig::default();
        let result = assess("short note", &cfg);
        // word_weight=0.5 contributes exactly 0.25 when word_score is neutral 0.5
        assert!(result.ocr_quality > 0.0);
    }

    #[test]
    fn replacement_characters_lower_corruption_score() {
        let cfg = QualityConfig::default();
        let clean = assess(&clean_document(20), &cfg);
        let corrupted_text = clean_document(20).replace(' ', "\u{FFFD}");
        let corrupted = assess(&corrupted_text, &cfg);
        assert!(corrupted.mojibake_rate > clean.mojibake_rate);
        assert!(corrupted.ocr_quality < clean.ocr_quality);
    }

    #[test]
    fn redaction_blocks_are_detected() {
        let cfg = QualityConfig::default();
        let text = format!(
            "{} {} {} {}",
            "█████".repeat(1),
            clean_document(5),
            "█████".repeat(1),
            "█████".repeat(1)
        );
        let result = assess(&text, &cfg);
        assert!(result.has_redactions);
    }

    #[test]
    fn redacted_marker_text_is_detected() {
        let cfg = QualityConfig::default();
        let text = format!(
            "{} [REDACTED] [redacted] [Redacted]",
            clean_document(10)
        );
        let result = assess(&text, &cfg);
        assert!(result.has_redactions);
    }

    #[test]
    fn very_short_text_is_a_fragment() {
        let cfg = QualityConfig::default();
        let result = assess("too short", &cfg);
        assert_eq!(result.completeness, Completeness::Fragment);
    }

    #[test]
    fn truncation_marker_forces_fragment() {
        let cfg = QualityConfig::default();
        let mut text = clean_document(20);
        text.push_str(" (continued)");
        let result = assess(&text, &cfg);
        assert_eq!(result.completeness, Completeness::Fragment);
    }

    #[test]
    fn page_gap_is_classified_partial() {
        let cfg = QualityConfig::default();
        let text = format!(
            "{} Page 1 of 5 ... Page 2 of 5 ... Page 5 of 5",
            clean_document(20)
        );
        let result = assess(&text, &cfg);
        assert_eq!(result.completeness, Completeness::Partial);
    }

    #[test]
    fn sequential_pages_are_complete() {
        let cfg = QualityConfig::default();
        let text = format!(
            "{} Page 1 of 3 ... Page 2 of 3 ... Page 3 of 3",
            clean_document(20)
        );
        let result = assess(&text, &cfg);
        assert_eq!(result.completeness, Completeness::Complete);
    }

    #[test]
    fn ocr_quality_is_clamped_to_unit_interval() {
        let cfg = QualityConfig::default();
        let result = assess("", &cfg);
        assert!((0.0..=1.0).contains(&result.ocr_quality));
    }
}
