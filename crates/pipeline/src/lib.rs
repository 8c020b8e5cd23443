//! Batch directory ingest: discover files under a root
//! directory, hash/assess/classify each one, commit it to the [`index::Store`],
//! and report a deterministic summary.
//!
//! # Concurrency
//!
//! Stage 1 ([`ingest::prepare_file`] — read, hash, canonicalize, assess
//! quality, extract metadata) runs across a `rayon` thread pool, one task
//! per file, bounded by `PipelineConfig::workers`. Stage 2
//! ([`ingest::commit_file`] — dedup classification and the store write)
//! runs on the calling thread in file-discovery order, respecting the
//! store's single-writer model; this keeps the batch's final store
//! contents order-independent regardless of how stage 1's tasks happened
//! to finish.

mod cancel;
mod config;
mod discover;
mod error;
mod ingest;
mod progress;
mod report;
mod retry;
mod timeout;

pub use crate::cancel::CancellationToken;
pub use crate::config::PipelineConfig;
pub use crate::error::{CommitError, FileError, FileErrorKind, PipelineError};
pub use crate::ingest::{BatchContext, CommitOutcome, IngestConfigs};
pub use crate::progress::{ProgressEvent, ProgressTracker};
pub use crate::report::{Report, RunStatus};

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use index::Store;

/// Ingest every eligible file under `root` into `store`, reporting
/// progress through `on_progress` at the cadence configured in `cfg`.
///
/// Returns a [`Report`] summarizing the run; a per-file failure never
/// aborts the batch — it is recorded in `Report::errors` and
/// `Report::error_counts` and the walk continues. A file whose hashing
/// and extraction exceed `cfg.per_file_timeout_secs` is recorded the same
/// way, as a [`FileErrorKind::Timeout`].
///
/// `cancel` is checked between files; once set, the run finishes the file
/// currently in flight, commits everything decided so far, and returns a
/// [`Report`] with `status` set to [`RunStatus::Aborted`] instead of
/// walking the rest of `root`. Pass [`CancellationToken::default`] for a
/// run that can never be cancelled.
pub fn process_directory(
    store: &Store,
    root: &Path,
    batch: &BatchContext,
    cfg: &PipelineConfig,
    ingest_cfg: &IngestConfigs,
    cancel: &CancellationToken,
    mut on_progress: impl FnMut(ProgressEvent),
) -> Result<Report, PipelineError> {
    cfg.validate()?;
    if !root.is_dir() {
        return Err(PipelineError::SourceDirUnreadable(root.to_path_buf()));
    }

    let started_at = chrono::Utc::now();
    let files = discover::discover_files(root)
        .map_err(|_| PipelineError::SourceDirUnreadable(root.to_path_buf()))?;
    tracing::info!(root = %root.display(), file_count = files.len(), "starting ingest run");

    let mut tracker =
        progress::ProgressTracker::new(files.len(), Duration::from_millis(cfg.progress_interval_millis));

    let mut already_indexed = 0usize;
    let mut new_canonicals = 0usize;
    let mut attached_as_duplicate = 0usize;
    let mut partial_overlaps_recorded = 0usize;
    let mut low_quality_sources = 0usize;
    let mut errors: Vec<FileError> = Vec::new();
    let mut error_counts: BTreeMap<FileErrorKind, usize> = BTreeMap::new();
    let per_file_timeout = Duration::from_secs(cfg.per_file_timeout_secs);
    let mut aborted = false;

    // Stage 1: hash/assess every file in parallel, chunked so stage 2's
    // serialized commits never wait on the whole batch finishing stage 1.
    'batches: for chunk in files.chunks(cfg.batch_size.max(1)) {
        if cancel.is_cancelled() {
            aborted = true;
            break 'batches;
        }

        let prepared: Vec<Result<Option<ingest::PreparedFile>, FileError>> = if cfg.workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(cfg.workers)
                .build()
                .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
            pool.install(|| {
                use rayon::prelude::*;
                chunk
                    .par_iter()
                    .map(|path| ingest::prepare_file(store, path, batch, ingest_cfg, per_file_timeout))
                    .collect()
            })
        } else {
            chunk
                .iter()
                .map(|path| ingest::prepare_file(store, path, batch, ingest_cfg, per_file_timeout))
                .collect()
        };

        // Stage 2: serialized commits, in discovery order for determinism.
        for result in prepared {
            let outcome = match result {
                Ok(Some(prepared_file)) => match ingest::commit_file(
                    store,
                    &prepared_file,
                    ingest_cfg,
                    cfg.min_ocr_quality,
                    cfg.artifacts_dir.as_deref(),
                ) {
                    Ok(outcome) => Ok(outcome),
                    Err(crate::error::CommitError::File(file_error)) => Err(file_error),
                    // Store contention that exhausted its retry budget is
                    // fatal to the whole run, not a per-file error.
                    Err(crate::error::CommitError::Fatal(pipeline_error)) => {
                        return Err(pipeline_error)
                    }
                },
                Ok(None) => {
                    already_indexed += 1;
                    tracker.record_file(false, false);
                    if let Some(event) = tracker.maybe_emit() {
                        on_progress(event);
                    }
                    continue;
                }
                Err(file_error) => Err(file_error),
            };

            match outcome {
                Ok(ingest::CommitOutcome::New { low_quality, partial_overlaps, .. }) => {
                    new_canonicals += 1;
                    partial_overlaps_recorded += partial_overlaps;
                    if low_quality {
                        low_quality_sources += 1;
                    }
                    tracker.record_file(false, false);
                }
                Ok(ingest::CommitOutcome::Attached { partial_overlaps, .. }) => {
                    attached_as_duplicate += 1;
                    partial_overlaps_recorded += partial_overlaps;
                    tracker.record_file(true, false);
                }
                Err(file_error) => {
                    *error_counts.entry(file_error.kind).or_insert(0) += 1;
                    if errors.len() < cfg.error_samples_per_kind * 6 {
                        errors.push(file_error);
                    }
                    tracker.record_file(false, true);
                }
            }
            if let Some(event) = tracker.maybe_emit() {
                on_progress(event);
            }

            // Finish the file just committed, then stop — the rest of this
            // chunk and any later chunks are left unprocessed.
            if cancel.is_cancelled() {
                aborted = true;
                break 'batches;
            }
        }
    }

    on_progress(tracker.snapshot());
    let status = if aborted {
        RunStatus::Aborted
    } else {
        RunStatus::Completed
    };
    tracing::info!(
        ?status,
        new_canonicals,
        attached_as_duplicate,
        already_indexed,
        error_count = errors.len(),
        "ingest run finished"
    );

    Ok(Report {
        status,
        started_at,
        finished_at: chrono::Utc::now(),
        total_files: files.len(),
        processed: new_canonicals + attached_as_duplicate,
        already_indexed,
        new_canonicals,
        attached_as_duplicate,
        partial_overlaps_recorded,
        low_quality_sources,
        errors,
        error_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use index::SourceAuthority;
    use tempfile::tempdir;

    fn ingest_configs() -> IngestConfigs {
        IngestConfigs {
            canonical: canonical::CanonicalizeConfig::default(),
            quality: quality::QualityConfig::default(),
            dedup: dedup::DedupConfig::default(),
            selector: selector::SelectorConfig::default(),
        }
    }

    fn batch() -> BatchContext {
        BatchContext {
            source_name: "archive.org".to_string(),
            source_url: None,
            collection: "batch-1".to_string(),
            authority: SourceAuthority::Archive,
            quality_score: 0.9,
            format_override: None,
        }
    }

    #[test]
    fn processes_a_small_directory_end_to_end() {
        let source_dir = tempdir().unwrap();
        std::fs::write(source_dir.path().join("a.txt"), "First unique document body.").unwrap();
        std::fs::write(source_dir.path().join("b.txt"), "First unique document body.").unwrap();
        std::fs::write(source_dir.path().join("c.txt"), "A completely different body.").unwrap();

        let store_dir = tempdir().unwrap();
        let store = Store::open(store_dir.path().join("index.redb")).unwrap();

        let report = process_directory(
            &store,
            source_dir.path(),
            &batch(),
            &PipelineConfig::default(),
            &ingest_configs(),
            &CancellationToken::default(),
            |_event| {},
        )
        .unwrap();

        assert_eq!(report.total_files, 3);
        assert_eq!(report.new_canonicals, 2);
        assert_eq!(report.attached_as_duplicate, 1);
        assert!(report.errors.is_empty());
        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn rerunning_over_the_same_directory_skips_already_indexed_files() {
        let source_dir = tempdir().unwrap();
        std::fs::write(source_dir.path().join("a.txt"), "Some content here.").unwrap();

        let store_dir = tempdir().unwrap();
        let store = Store::open(store_dir.path().join("index.redb")).unwrap();

        process_directory(
            &store,
            source_dir.path(),
            &batch(),
            &PipelineConfig::default(),
            &ingest_configs(),
            &CancellationToken::default(),
            |_event| {},
        )
        .unwrap();

        let second = process_directory(
            &store,
            source_dir.path(),
            &batch(),
            &PipelineConfig::default(),
            &ingest_configs(),
            &CancellationToken::default(),
            |_event| {},
        )
        .unwrap();

        assert_eq!(second.already_indexed, 1);
        assert_eq!(second.new_canonicals, 0);
    }

    #[test]
    fn rejects_a_nonexistent_source_directory() {
        let store_dir = tempdir().unwrap();
        let store = Store::open(store_dir.path().join("index.redb")).unwrap();
        let result = process_directory(
            &store,
            Path::new("/nonexistent/path/for/this/test"),
            &batch(),
            &PipelineConfig::default(),
            &ingest_configs(),
            &CancellationToken::default(),
            |_event| {},
        );
        assert!(matches!(result, Err(PipelineError::SourceDirUnreadable(_))));
    }

    #[test]
    fn cancelling_mid_run_stops_early_and_reports_aborted() {
        let source_dir = tempdir().unwrap();
        for i in 0..6 {
            std::fs::write(
                source_dir.path().join(format!("doc-{i}.txt")),
                format!("Unique document body number {i}."),
            )
            .unwrap();
        }

        let store_dir = tempdir().unwrap();
        let store = Store::open(store_dir.path().join("index.redb")).unwrap();

        // batch_size 1 checks cancellation after every commit, and a zero
        // progress interval lifts the cadence gate so on_progress fires for
        // every file instead of at most once per second — together these
        // make cancelling after the first commit deterministic.
        let cfg = PipelineConfig {
            batch_size: 1,
            progress_interval_millis: 0,
            ..PipelineConfig::default()
        };
        let cancel = CancellationToken::new();
        let cancel_after_first = cancel.clone();
        let mut seen = 0;

        let report = process_directory(
            &store,
            source_dir.path(),
            &batch(),
            &cfg,
            &ingest_configs(),
            &cancel,
            |_event| {
                seen += 1;
                if seen == 1 {
                    cancel_after_first.cancel();
                }
            },
        )
        .unwrap();

        assert_eq!(report.status, RunStatus::Aborted);
        assert_eq!(report.exit_code(), 2);
        assert!(report.new_canonicals < 6);
    }

    #[test]
    fn a_file_exceeding_the_per_file_timeout_is_recorded_as_a_timeout_error() {
        let source_dir = tempdir().unwrap();
        std::fs::write(source_dir.path().join("a.txt"), "Some content here.").unwrap();

        let store_dir = tempdir().unwrap();
        let store = Store::open(store_dir.path().join("index.redb")).unwrap();

        let cfg = PipelineConfig {
            // No file can possibly hash and extract within a nanosecond,
            // so this deterministically exercises the timeout path.
            per_file_timeout_secs: 1,
            ..PipelineConfig::default()
        };
        // per_file_timeout_secs has whole-second granularity in config, so
        // drive the timeout directly through ingest::prepare_file instead
        // of trying to race process_directory's coarser unit.
        let prepared = ingest::prepare_file(
            &store,
            &source_dir.path().join("a.txt"),
            &batch(),
            &ingest_configs(),
            Duration::from_nanos(1),
        );
        assert!(matches!(
            prepared,
            Err(FileError { kind: FileErrorKind::Timeout, .. })
        ));

        // A realistic timeout still lets the same file process normally.
        let report = process_directory(
            &store,
            source_dir.path(),
            &batch(),
            &cfg,
            &ingest_configs(),
            &CancellationToken::default(),
            |_event| {},
        )
        .unwrap();
        assert_eq!(report.new_canonicals, 1);
        assert!(report.errors.is_empty());
    }
}
