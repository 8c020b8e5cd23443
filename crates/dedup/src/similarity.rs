//! Text-similarity fallback used alongside the fuzzy-hash score: the final
//! fuzzy score is `max(fuzzy_score, text_similarity)`.
//!
//! A sequence-ratio (difflib-style) comparison is the obvious choice here,
//! but an exact longest-common-subsequence ratio is O(n·m) — quadratic in
//! the very quantity (document length) this engine needs to stay linear in
//! to hit bounded memory and deterministic throughput, and this crate's own
//! candidate-fan-out rule already bans O(N²) comparisons at the
//! canonical-pair level. We use a character-trigram Dice coefficient
//! instead: O(n) to build, O(min(n,m)) to compare, symmetric, and — like a
//! sequence ratio — close to 1.0 for near-identical text and close to 0.0
//! for unrelated text. See `DESIGN.md`.

use std::collections::HashMap;

/// Dice coefficient of the character-trigram multisets of `a` and `b`,
/// restricted to their first `max_chars` characters each.
///
/// Returns 1.0 for two (truncated) strings with fewer than 3 characters
/// that are equal, and 0.0 if either has no trigrams and they are not
/// equal.
pub fn text_similarity(a: &str, b: &str, max_chars: usize) -> f64 {
    let a: String = a.chars().take(max_chars).collect();
    let b: String = b.chars().take(max_chars).collect();

    let trigrams_a = trigram_counts(&a);
    let trigrams_b = trigram_counts(&b);

    if trigrams_a.is_empty() && trigrams_b.is_empty() {
        return if a == b { 1.0 } else { 0.0 };
    }

    let mut shared = 0usize;
    for (trigram, count_a) in &trigrams_a {
        if let Some(count_b) = trigrams_b.get(trigram) {
            shared += (*count_a).min(*count_b);
        }
    }

    let total: usize = trigrams_a.values().sum::<usize>() + trigrams_b.values().sum::<usize>();
    if total == 0 {
        return 0.0;
    }
    (2 * shared) as f64 / total as f64
}

fn trigram_counts(s: &str) -> HashMap<[char; 3], usize> {
    let chars: Vec<char> = s.chars().collect();
    let mut counts = HashMap::new();
    if chars.len() < 3 {
        return counts;
    }
    for window in chars.windows(3) {
        *counts.entry([window[0], window[1], window[2]]).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_scores_one() {
        assert_eq!(text_similarity("the quick brown fox", "the quick brown fox", 10_000), 1.0);
    }

    #[test]
    fn unrelated_text_scores_near_zero() {
        let score = text_similarity("alpha beta gamma delta", "xyzzy plugh wibble", 10_000);
        assert!(score < 0.2, "expected low similarity, got {score}");
    }

    #[test]
    fn near_duplicate_scores_high() {
        let a = "the quick brown fox jumps over the lazy dog";
        let b = "the quick brown fox jumped over the lazy dog";
        let score = text_similarity(a, b, 10_000);
        assert!(score > 0.85, "expected high similarity, got {score}");
    }

    #[test]
    fn truncates_to_max_chars() {
        let a = "a".repeat(20_000);
        let b = "a".repeat(20_000);
        assert_eq!(text_similarity(&a, &b, 10_000), 1.0);
    }

    #[test]
    fn empty_inputs_handled() {
        assert_eq!(text_similarity("", "", 10_000), 1.0);
        assert_eq!(text_similarity("ab", "", 10_000), 0.0);
    }
}
