//! Embedded dictionary used for `word_score`.
//!
//! The word list is compiled into the binary via `include_str!` rather than
//! loaded from a path at runtime, so quality assessment works offline and
//! produces identical results regardless of the host filesystem.

use std::collections::HashSet;
use std::sync::OnceLock;

const EMBEDDED_DICTIONARY: &str = include_str!("../assets/dictionary_en.txt");

static DICTIONARY: OnceLock<HashSet<&'static str>> = OnceLock::new();

fn dictionary() -> &'static HashSet<&'static str> {
    DICTIONARY.get_or_init(|| EMBEDDED_DICTIONARY.lines().filter(|l| !l.is_empty()).collect())
}

/// Returns true if `word` (already lowercased) appears in the embedded
/// dictionary.
pub fn contains(word: &str) -> bool {
    dictionary().contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_words_are_present() {
        assert!(contains("the"));
        assert!(contains("document"));
        assert!(contains("court"));
    }

    #[test]
    fn nonsense_tokens_are_absent() {
        assert!(!contains("xzqvwlkjh"));
        assert!(!contains(""));
    }

    #[test]
    fn dictionary_is_idempotent_across_calls() {
        let a = contains("the");
        let b = contains("the");
        assert_eq!(a, b);
    }
}
