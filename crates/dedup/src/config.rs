//! Tunable thresholds for the deduplication strategies.

use serde::{Deserialize, Serialize};

use crate::error::DedupError;

fn default_fuzzy_threshold() -> f64 {
    0.90
}

fn default_fuzzy_over_metadata() -> f64 {
    0.95
}

fn default_partial_overlap_min() -> f64 {
    0.10
}

fn default_partial_overlap_max() -> f64 {
    0.90
}

fn default_text_similarity_chars() -> usize {
    10_000
}

/// Configuration for [`crate::classify`] and [`crate::find_partial_overlaps`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DedupConfig {
    /// Minimum `max(fuzzy_score, text_similarity)` to count as a fuzzy
    /// match. Inclusive: exactly this value counts as a match.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// When both a fuzzy and a metadata match apply to the same document,
    /// fuzzy wins only once its similarity exceeds this value; otherwise
    /// metadata wins.
    #[serde(default = "default_fuzzy_over_metadata")]
    pub fuzzy_over_metadata_threshold: f64,

    /// Lower bound (exclusive) of the partial-overlap recording window.
    #[serde(default = "default_partial_overlap_min")]
    pub partial_overlap_min: f64,

    /// Upper bound (exclusive) of the partial-overlap recording window.
    #[serde(default = "default_partial_overlap_max")]
    pub partial_overlap_max: f64,

    /// How many leading normalized characters feed the text-similarity
    /// fallback used alongside the fuzzy-hash score.
    #[serde(default = "default_text_similarity_chars")]
    pub text_similarity_chars: usize,

    /// Bypass step 4 (fuzzy matching) entirely, for speed on collections
    /// where only exact/metadata duplicates matter.
    #[serde(default)]
    pub skip_fuzzy: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        DedupConfig {
            fuzzy_threshold: default_fuzzy_threshold(),
            fuzzy_over_metadata_threshold: default_fuzzy_over_metadata(),
            partial_overlap_min: default_partial_overlap_min(),
            partial_overlap_max: default_partial_overlap_max(),
            text_similarity_chars: default_text_similarity_chars(),
            skip_fuzzy: false,
        }
    }
}

impl DedupConfig {
    pub fn validate(&self) -> Result<(), DedupError> {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(DedupError::InvalidConfig(format!(
                "fuzzy_threshold must be in [0.0, 1.0], got {}",
                self.fuzzy_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.fuzzy_over_metadata_threshold) {
            return Err(DedupError::InvalidConfig(format!(
                "fuzzy_over_metadata_threshold must be in [0.0, 1.0], got {}",
                self.fuzzy_over_metadata_threshold
            )));
        }
        if !(0.0..1.0).contains(&self.partial_overlap_min)
            || !(0.0..=1.0).contains(&self.partial_overlap_max)
            || self.partial_overlap_min >= self.partial_overlap_max
        {
            return Err(DedupError::InvalidConfig(format!(
                "partial overlap bounds must satisfy 0 <= min < max <= 1, got [{}, {}]",
                self.partial_overlap_min, self.partial_overlap_max
            )));
        }
        if self.text_similarity_chars == 0 {
            return Err(DedupError::InvalidConfig(
                "text_similarity_chars must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(DedupConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let cfg = DedupConfig {
            fuzzy_threshold: 1.5,
            ..DedupConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_inverted_overlap_bounds() {
        let cfg = DedupConfig {
            partial_overlap_min: 0.9,
            partial_overlap_max: 0.1,
            ..DedupConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
