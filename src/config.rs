//! YAML configuration file support for the document canonicalization engine.
//!
//! This module loads a single top-level [`EngineConfig`] from a YAML file,
//! covering every engine tunable: the canonicalization version,
//! quality-assessment weights, deduplication thresholds, selector weights,
//! and batch pipeline behavior. Each section mirrors its crate's own
//! `*Config` type one-for-one so the YAML file and the Rust API never
//! drift apart.
//!
//! ## Example YAML configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "county-foia-archive"
//!
//! store:
//!   path: "./data/index.redb"
//!   lock_path: "./data/index.lock"
//!
//! canonical:
//!   version: 1
//!   normalize_unicode: true
//!   lowercase: true
//!   strip_punctuation: false
//!
//! quality:
//!   word_weight: 0.5
//!   corruption_weight: 0.3
//!   line_weight: 0.2
//!
//! dedup:
//!   fuzzy_threshold: 0.90
//!   fuzzy_over_metadata_threshold: 0.95
//!   partial_overlap_min: 0.10
//!   partial_overlap_max: 0.90
//!   skip_fuzzy: false
//!
//! selector:
//!   ocr_quality_weight: 0.40
//!   redaction_weight: 0.25
//!   completeness_weight: 0.20
//!   authority_weight: 0.10
//!   file_quality_weight: 0.05
//!
//! pipeline:
//!   batch_size: 100
//!   workers: 1
//!   min_ocr_quality: 0.70
//! ```
//!
//! Environment variables mirror these keys with an `DCE_` prefix (e.g.
//! `DCE_PIPELINE_WORKERS=4`); applying them is the CLI's job (`src/bin/dce.rs`),
//! not this module's — `EngineConfig` itself only parses and validates YAML.

use std::fs;
use std::path::{Path, PathBuf};

use dedup::DedupConfig;
use quality::QualityConfig;
use selector::SelectorConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use canonical::CanonicalizeConfig;
use pipeline::PipelineConfig;

/// Errors that can occur when loading a YAML configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Where the index store's backing file lives on disk. `Store::open`
/// derives its own sentinel lock file by appending a `.lock`
/// extension to this path, so there is no separate lock-path setting here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct StoreYamlConfig {
    pub path: PathBuf,
}

impl Default for StoreYamlConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/index.redb"),
        }
    }
}

/// Top-level YAML configuration for the whole engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Configuration format version.
    pub version: String,

    /// Optional human-readable name/description for this configuration.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub store: StoreYamlConfig,

    #[serde(default)]
    pub canonical: CanonicalizeConfig,

    #[serde(default)]
    pub quality: QualityConfig,

    #[serde(default)]
    pub dedup: DedupConfig,

    #[serde(default)]
    pub selector: SelectorConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl EngineConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section, failing fast on an out-of-range weight or
    /// unknown enum value rather than at first use.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.canonical
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.quality
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.dedup
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.selector
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.pipeline
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            store: StoreYamlConfig::default(),
            canonical: CanonicalizeConfig::default(),
            quality: QualityConfig::default(),
            dedup: DedupConfig::default(),
            selector: SelectorConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_unsupported_version() {
        let yaml = "version: \"9.9\"\n";
        let result = EngineConfig::from_yaml(yaml);
        assert!(matches!(result, Err(ConfigLoadError::UnsupportedVersion(_))));
    }

    #[test]
    fn full_yaml_roundtrip() {
        let yaml = r#"
version: "1.0"
name: "county-foia-archive"

store:
  path: "./data/index.redb"

canonical:
  version: 1
  normalize_unicode: true
  lowercase: true
  strip_punctuation: false

quality:
  word_weight: 0.5
  corruption_weight: 0.3
  line_weight: 0.2

dedup:
  fuzzy_threshold: 0.9
  fuzzy_over_metadata_threshold: 0.95
  partial_overlap_min: 0.1
  partial_overlap_max: 0.9
  skip_fuzzy: false

selector:
  ocr_quality_weight: 0.4
  redaction_weight: 0.25
  completeness_weight: 0.2
  authority_weight: 0.1
  file_quality_weight: 0.05

pipeline:
  batch_size: 50
  workers: 4
  min_ocr_quality: 0.7
"#;
        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name.as_deref(), Some("county-foia-archive"));
        assert_eq!(config.pipeline.batch_size, 50);
        assert_eq!(config.pipeline.workers, 4);
        assert_eq!(config.store.path, PathBuf::from("./data/index.redb"));
    }
}
