//! Selection weights. Fixed by default, but configurable so an
//! operator can, for instance, weight source authority more heavily for a
//! collection known to have unreliable OCR.

use serde::{Deserialize, Serialize};

use crate::error::SelectorError;

fn default_ocr_quality_weight() -> f64 {
    0.40
}
fn default_redaction_weight() -> f64 {
    0.25
}
fn default_completeness_weight() -> f64 {
    0.20
}
fn default_authority_weight() -> f64 {
    0.10
}
fn default_file_quality_weight() -> f64 {
    0.05
}
fn default_redaction_penalty_per_marker() -> f64 {
    0.2
}

/// Weights for the five score terms. Must sum to `1.0` within `1e-6`,
/// mirroring the `QualityConfig` weight-validation convention used
/// elsewhere in this codebase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectorConfig {
    #[serde(default = "default_ocr_quality_weight")]
    pub ocr_quality_weight: f64,
    #[serde(default = "default_redaction_weight")]
    pub redaction_weight: f64,
    #[serde(default = "default_completeness_weight")]
    pub completeness_weight: f64,
    #[serde(default = "default_authority_weight")]
    pub authority_weight: f64,
    #[serde(default = "default_file_quality_weight")]
    pub file_quality_weight: f64,
    /// Per-redaction-marker score penalty applied when a source has
    /// redactions: `max(0, 1 - redaction_penalty_per_marker * redaction_count)`.
    #[serde(default = "default_redaction_penalty_per_marker")]
    pub redaction_penalty_per_marker: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig {
            ocr_quality_weight: default_ocr_quality_weight(),
            redaction_weight: default_redaction_weight(),
            completeness_weight: default_completeness_weight(),
            authority_weight: default_authority_weight(),
            file_quality_weight: default_file_quality_weight(),
            redaction_penalty_per_marker: default_redaction_penalty_per_marker(),
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> Result<(), SelectorError> {
        let sum = self.ocr_quality_weight
            + self.redaction_weight
            + self.completeness_weight
            + self.authority_weight
            + self.file_quality_weight;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(SelectorError::InvalidConfig(format!(
                "selection weights must sum to 1.0, got {sum}"
            )));
        }
        if self.redaction_penalty_per_marker < 0.0 {
            return Err(SelectorError::InvalidConfig(
                "redaction_penalty_per_marker must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_sum_to_one_and_validate() {
        assert!(SelectorConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let cfg = SelectorConfig {
            ocr_quality_weight: 0.5,
            ..SelectorConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
