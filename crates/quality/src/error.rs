//! Error types for quality assessment and its configuration.

use thiserror::Error;

/// Errors raised while assessing text quality or validating [`crate::QualityConfig`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QualityError {
    /// `word_weight + corruption_weight + line_weight` did not sum to 1.0
    /// within the tolerated epsilon.
    #[error("quality score weights must sum to 1.0, got {sum}")]
    WeightsDoNotSumToOne { sum: f64 },

    /// A weight or threshold was outside its valid range.
    #[error("invalid quality config: {0}")]
    InvalidConfig(String),
}
