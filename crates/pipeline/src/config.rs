//! Tunable behavior for one [`crate::process_directory`] run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

fn default_batch_size() -> usize {
    100
}
fn default_workers() -> usize {
    1
}
fn default_per_file_timeout_secs() -> u64 {
    60
}
fn default_progress_interval_millis() -> u64 {
    1000
}
fn default_min_ocr_quality() -> f64 {
    0.70
}
fn default_max_store_retries() -> u32 {
    5
}
fn default_error_samples_per_kind() -> usize {
    10
}

/// Runtime configuration for [`crate::process_directory`]. Cheap to clone;
/// shared read-only across the worker pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Commit/progress-reporting granularity.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Number of worker threads hashing/extracting/assessing independent
    /// files concurrently. `1` means no additional
    /// parallelism beyond the calling thread.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Bypass the fuzzy-matching strategy.
    #[serde(default)]
    pub skip_fuzzy: bool,

    /// Per-file hashing/store-operation timeout. A file that
    /// exceeds this is recorded as a per-file failure, not a global abort.
    #[serde(default = "default_per_file_timeout_secs")]
    pub per_file_timeout_secs: u64,

    /// Minimum interval between progress events, bounding their cadence to
    /// at most once per interval.
    #[serde(default = "default_progress_interval_millis")]
    pub progress_interval_millis: u64,

    /// Threshold below which the final report flags a source's
    /// `ocr_quality` as a warning.
    #[serde(default = "default_min_ocr_quality")]
    pub min_ocr_quality: f64,

    /// Maximum exponential-backoff retries for a contended store write
    /// before the batch aborts.
    #[serde(default = "default_max_store_retries")]
    pub max_store_retries: u32,

    /// How many example messages per [`crate::error::FileErrorKind`] the
    /// final report retains.
    #[serde(default = "default_error_samples_per_kind")]
    pub error_samples_per_kind: usize,

    /// Root directory for the canonical `.md` output artifacts. `None`
    /// skips artifact writing entirely — the index store remains the
    /// system of record either way.
    #[serde(default)]
    pub artifacts_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            batch_size: default_batch_size(),
            workers: default_workers(),
            skip_fuzzy: false,
            per_file_timeout_secs: default_per_file_timeout_secs(),
            progress_interval_millis: default_progress_interval_millis(),
            min_ocr_quality: default_min_ocr_quality(),
            max_store_retries: default_max_store_retries(),
            error_samples_per_kind: default_error_samples_per_kind(),
            artifacts_dir: None,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.batch_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "batch_size must be >= 1".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(PipelineError::InvalidConfig(
                "workers must be >= 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_ocr_quality) {
            return Err(PipelineError::InvalidConfig(format!(
                "min_ocr_quality must be in [0.0, 1.0], got {}",
                self.min_ocr_quality
            )));
        }
        if self.per_file_timeout_secs == 0 {
            return Err(PipelineError::InvalidConfig(
                "per_file_timeout_secs must be >= 1".to_string(),
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
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_batch_size() {
        let cfg = PipelineConfig {
            batch_size: 0,
            ..PipelineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_min_ocr_quality() {
        let cfg = PipelineConfig {
            min_ocr_quality: 1.5,
            ..PipelineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
