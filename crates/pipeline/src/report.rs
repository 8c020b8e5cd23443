//! The final summary returned by one [`crate::process_directory`] call.
//! A run moves through `Idle -> Running -> (Completed | Aborted)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FileError, FileErrorKind};

/// Terminal state of a pipeline run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Aborted,
}

/// Summary of one `process_directory` run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_files: usize,
    pub processed: usize,
    /// Files skipped because `(source_name, file_path)` was already
    /// indexed from a prior run.
    pub already_indexed: usize,
    pub new_canonicals: usize,
    pub attached_as_duplicate: usize,
    pub partial_overlaps_recorded: usize,
    /// Sources whose `ocr_quality` fell below `PipelineConfig::min_ocr_quality`.
    pub low_quality_sources: usize,
    pub errors: Vec<FileError>,
    /// Per-kind error counts, independent of how many example messages
    /// were retained in `errors`.
    pub error_counts: std::collections::BTreeMap<FileErrorKind, usize>,
}

impl Report {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Exit code this report maps to under the CLI's convention:
    /// `0` clean, `3` partial failure (some files errored but the run
    /// otherwise completed), `2` for an aborted run.
    pub fn exit_code(&self) -> i32 {
        match self.status {
            RunStatus::Aborted => 2,
            RunStatus::Completed if !self.errors.is_empty() => 3,
            RunStatus::Completed => 0,
        }
    }
}
