//! Configuration for the quality assessor.
//!
//! Mirrors the `*Config` + `validate()` convention used throughout this
//! engine: defaults are safe to use as-is, but any caller-supplied override
//! is checked once, at construction, rather than silently tolerated or
//! checked piecemeal inside `assess()`.

use serde::{Deserialize, Serialize};

use crate::error::QualityError;

const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// Tunable weights and thresholds for [`crate::assess`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityConfig {
    /// Weight of `word_score` in the composite `ocr_quality` score.
    #[serde(default = "default_word_weight")]
    pub word_weight: f64,

    /// Weight of `corruption_score` in the composite `ocr_quality` score.
    #[serde(default = "default_corruption_weight")]
    pub corruption_weight: f64,

    /// Weight of `line_score` in the composite `ocr_quality` score.
    #[serde(default = "default_line_weight")]
    pub line_weight: f64,

    /// Minimum whitespace-delimited token count before `word_score` is
    /// computed from the dictionary; below this, `word_score` is the
    /// neutral value 0.5.
    #[serde(default = "default_min_tokens_for_word_score")]
    pub min_tokens_for_word_score: usize,

    /// Number of redaction markers (runs of block characters,
    /// "[REDACTED]", or long underscore/dash runs) required before
    /// `has_redactions` is set.
    #[serde(default = "default_redaction_marker_threshold")]
    pub redaction_marker_threshold: usize,

    /// Text shorter than this many characters is classified `fragment`
    /// regardless of other signals.
    #[serde(default = "default_fragment_length_threshold")]
    pub fragment_length_threshold: usize,
}

fn default_word_weight() -> f64 {
    0.5
}
fn default_corruption_weight() -> f64 {
    0.3
}
fn default_line_weight() -> f64 {
    0.2
}
fn default_min_tokens_for_word_score() -> usize {
    50
}
fn default_redaction_marker_threshold() -> usize {
    3
}
fn default_fragment_length_threshold() -> usize {
    200
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            word_weight: default_word_weight(),
            corruption_weight: default_corruption_weight(),
            line_weight: default_line_weight(),
            min_tokens_for_word_score: default_min_tokens_for_word_score(),
            redaction_marker_threshold: default_redaction_marker_threshold(),
            fragment_length_threshold: default_fragment_length_threshold(),
        }
    }
}

impl QualityConfig {
    /// Validate this configuration.
    ///
    /// # Errors
    ///
    /// - [`QualityError::WeightsDoNotSumToOne`] if the three score weights
    ///   do not sum to `1.0` within `1e-6`.
    /// - [`QualityError::InvalidConfig`] if any weight is negative, or if
    ///   `redaction_marker_threshold` is zero.
    pub fn validate(&self) -> Result<(), QualityError> {
        if self.word_weight < 0.0 || self.corruption_weight < 0.0 || self.line_weight < 0.0 {
            return Err(QualityError::InvalidConfig(
                "quality score weights must be non-negative".into(),
            ));
        }
        let sum = self.word_weight + self.corruption_weight + self.line_weight;
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(QualityError::WeightsDoNotSumToOne { sum });
        }
        if self.redaction_marker_threshold == 0 {
            return Err(QualityError::InvalidConfig(
                "redaction_marker_threshold must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(QualityConfig::default().validate().is_ok());
    }

    #[test]
    fn weights_must_sum_to_one() {
        let cfg = QualityConfig {
            word_weight: 0.5,
            corruption_weight: 0.5,
            line_weight: 0.5,
            ..QualityConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(QualityError::WeightsDoNotSumToOne { .. })
        ));
    }

    #[test]
    fn negative_weight_rejected() {
        let cfg = QualityConfig {
            word_weight: -0.1,
            corruption_weight: 0.9,
            line_weight: 0.2,
            ..QualityConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(QualityError::InvalidConfig(_))));
    }

    #[test]
    fn zero_redaction_threshold_rejected() {
        let cfg = QualityConfig {
            redaction_marker_threshold: 0,
            ..QualityConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(QualityError::InvalidConfig(_))));
    }
}
