//! Per-file processing: read, hash, assess, extract metadata, classify,
//! and (serially) commit one source into the index.
//!
//! Stage 1 (everything in [`prepare_file`]) touches only the filesystem and
//! pure functions from `canonical`/`hasher`/`quality`/`metadata`, plus
//! read-only `Store` lookups — safe to run across a `rayon` thread pool.
//! Stage 2 ([`commit_file`]) calls `dedup::classify` and the `Store`'s
//! `commit_*` methods, which take a write transaction; `crate::lib` runs it
//! on a single thread to respect the store's single-writer model.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use artifact::write_artifact;

use canonical::CanonicalizeConfig;
use dedup::{DedupConfig, IncomingDocument};
use index::{
    CanonicalDocument, CanonicalId, DocumentSource, DuplicateGroup, LogStatus, ProcessingLogEntry,
    SourceAuthority, SourceFormat, Store,
};
use quality::QualityConfig;
use selector::SelectorConfig;

use crate::discover::{detect_format, sidecar_text_path};
use crate::error::{CommitError, FileError, FileErrorKind, PipelineError};
use crate::retry::{with_retry, RetryConfig};
use crate::timeout::run_with_timeout;

const FORM_FEED: char = '\u{000c}';

/// Everything the batch needs in order to hash, extract, and assess
/// documents the same way for every file in one run.
#[derive(Debug, Clone)]
pub struct IngestConfigs {
    pub canonical: CanonicalizeConfig,
    pub quality: QualityConfig,
    pub dedup: DedupConfig,
    pub selector: SelectorConfig,
}

/// Batch-level facts about the source being ingested that are not
/// recoverable from the file itself — `collection`, `authority`, and
/// `quality_score` describe where a file came from, not its bytes.
#[derive(Debug, Clone)]
pub struct BatchContext {
    pub source_name: String,
    pub source_url: Option<String>,
    pub collection: String,
    pub authority: SourceAuthority,
    /// External quality signal for this batch (e.g. a crawler's confidence
    /// in the transfer), distinct from the OCR-text-derived `ocr_quality`.
    pub quality_score: f64,
    /// Force every file in this batch to a single format (the CLI's
    /// `--format FMT` flag) instead of detecting it per file from the
    /// extension.
    pub format_override: Option<SourceFormat>,
}

/// Stage-1 output for one file: a fully-hashed, quality-assessed,
/// metadata-extracted [`IncomingDocument`] ready for dedup classification.
pub struct PreparedFile {
    pub file_path: PathBuf,
    pub incoming: IncomingDocument,
}

/// Stage 1. Returns `Ok(None)` when `(source_name, file_path)` was already
/// indexed by a prior run — the caller should
/// count this as `already_indexed` and skip stage 2 entirely.
///
/// The hashing/extraction/assessment work is bounded by `timeout`: a file
/// that has not finished within it is recorded as a
/// [`FileErrorKind::Timeout`] rather than blocking the rest of the batch
/// indefinitely.
pub fn prepare_file(
    store: &Store,
    file_path: &Path,
    batch: &BatchContext,
    cfg: &IngestConfigs,
    timeout: Duration,
) -> Result<Option<PreparedFile>, FileError> {
    let file_path_str = file_path.to_string_lossy().to_string();

    let already = store
        .already_processed(&batch.source_name, &file_path_str)
        .map_err(|e| io_error(&file_path_str, e.to_string()))?;
    if already.is_some() {
        return Ok(None);
    }

    let owned_path = file_path.to_path_buf();
    let owned_batch = batch.clone();
    let owned_cfg = cfg.clone();
    let worker_path = file_path_str.clone();

    match run_with_timeout(timeout, move || {
        prepare_from_bytes(&worker_path, &owned_path, &owned_batch, &owned_cfg)
    }) {
        Some(result) => result.map(Some),
        None => Err(file_error(
            &file_path_str,
            FileErrorKind::Timeout,
            format!("exceeded the {}s per-file timeout", timeout.as_secs_f64()),
        )),
    }
}

/// The CPU/IO-bound half of [`prepare_file`] — read, hash, canonicalize,
/// assess, extract metadata — with no dependency on `Store`, so it can run
/// on its own thread under [`run_with_timeout`].
fn prepare_from_bytes(
    file_path_str: &str,
    file_path: &Path,
    batch: &BatchContext,
    cfg: &IngestConfigs,
) -> Result<PreparedFile, FileError> {
    let bytes = std::fs::read(file_path)
        .map_err(|e| file_error(file_path_str, FileErrorKind::Io, e.to_string()))?;
    let format = batch.format_override.unwrap_or_else(|| detect_format(file_path));
    let text = extract_text(file_path, format, &bytes)
        .map_err(|e| file_error(file_path_str, FileErrorKind::Io, e))?;

    let pages = split_pages(&text);

    let file_hash = hasher::file_hash_bytes(&bytes)
        .map_err(|e| file_error(file_path_str, FileErrorKind::Hashing, e.to_string()))?;

    let whole_doc = canonical::canonicalize(file_path_str, &text, &cfg.canonical)
        .map_err(|e| file_error(file_path_str, FileErrorKind::Hashing, e.to_string()))?;
    let content_hash = whole_doc.sha256_hex.clone();
    let normalized_text = whole_doc.canonical_text.clone();

    // Fuzzy-matching near-duplicates only works when two OCR variants of the
    // same document land at comparable block sizes, which only happens when
    // the signature is built over the normalized text both variants
    // converge to — not over their (unrelated) raw file bytes.
    let fuzzy_hash = hasher::fuzzy_hash(normalized_text.as_bytes())
        .map_err(|e| file_error(file_path_str, FileErrorKind::Hashing, e.to_string()))?;

    let mut page_texts = Vec::with_capacity(pages.len());
    for (idx, page) in pages.iter().enumerate() {
        let page_id = format!("{file_path_str}#page-{}", idx + 1);
        let page_doc = canonical::canonicalize(&page_id, page, &cfg.canonical);
        match page_doc {
            Ok(doc) => page_texts.push(doc.canonical_text),
            // A page that canonicalizes to nothing (blank page) contributes
            // no page hash rather than aborting the whole file.
            Err(canonical::CanonicalError::EmptyInput) => {}
            Err(e) => {
                return Err(file_error(file_path_str, FileErrorKind::Hashing, e.to_string()))
            }
        }
    }
    let page_hashes = hasher::per_page_hashes(&page_texts)
        .map_err(|e| file_error(file_path_str, FileErrorKind::Hashing, e.to_string()))?;
    let per_page_hashes: Vec<String> = page_hashes.into_iter().map(|p| p.sha256_hex).collect();

    let assessment = quality::assess(&normalized_text, &cfg.quality);
    let metadata = metadata::extract(&normalized_text, None);

    let source = DocumentSource {
        source_name: batch.source_name.clone(),
        source_url: batch.source_url.clone(),
        collection: batch.collection.clone(),
        download_date: chrono::Utc::now(),
        pages: page_range(pages.len()),
        file_path: file_path_str.to_string(),
        quality_score: batch.quality_score,
        file_size: bytes.len() as u64,
        format,
        authority: batch.authority,
        redaction_count: assessment.redaction_count,
        has_redactions: assessment.has_redactions,
        ocr_quality: assessment.ocr_quality,
        completeness: assessment.completeness,
        page_count: pages.len().max(1) as u32,
        file_hash,
        content_hash,
        fuzzy_hash,
        per_page_hashes,
    };

    Ok(PreparedFile {
        file_path: PathBuf::from(&source.file_path),
        incoming: IncomingDocument {
            source,
            metadata,
            normalized_text,
        },
    })
}

/// Outcome of committing one [`PreparedFile`] to the store.
pub enum CommitOutcome {
    New {
        canonical_id: CanonicalId,
        low_quality: bool,
        partial_overlaps: usize,
    },
    Attached {
        canonical_id: CanonicalId,
        partial_overlaps: usize,
    },
}

/// Recover cached normalized text for every canonical the fuzzy strategy
/// would consider a candidate for `incoming`, so `dedup::classify` can
/// compute `text_similarity` instead of falling back to `fuzzy_hash` alone.
///
/// The index store never retains full document text (stream-first), so the
/// only durable place to read a candidate's body back from is its
/// canonical-file artifact — which only exists when `artifacts_dir` is
/// configured and that candidate has already been written at least once.
/// Candidates without a readable artifact are simply left out of the map;
/// `best_fuzzy_match` already treats a missing entry as its documented
/// fuzzy-hash-only fallback.
fn load_candidate_text(
    store: &Store,
    incoming: &IncomingDocument,
    artifacts_dir: Option<&Path>,
    skip_fuzzy: bool,
) -> HashMap<CanonicalId, String> {
    let Some(dir) = artifacts_dir else {
        return HashMap::new();
    };
    if skip_fuzzy {
        return HashMap::new();
    }

    let candidates = match dedup::fuzzy_candidates(store, &incoming.source.fuzzy_hash) {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch fuzzy candidates for text cache, falling back to fuzzy_hash only");
            return HashMap::new();
        }
    };

    candidates
        .into_iter()
        .filter_map(|doc| {
            let path = artifact::storage_path(dir, doc.document_type, doc.date.as_deref(), &doc.canonical_id);
            let body = artifact::read_artifact(&path).ok()?.body;
            Some((doc.canonical_id, body))
        })
        .collect()
}

/// Retry a store write against transient contention; on
/// exhaustion this is fatal to the whole batch rather than a per-file
/// error, since a lock held by another process won't clear up mid-run.
fn commit_with_retry<T>(
    mut op: impl FnMut() -> Result<T, index::IndexError>,
) -> Result<T, PipelineError> {
    let retry_cfg = RetryConfig::default();
    with_retry(&retry_cfg, &mut op).map_err(|source| PipelineError::StoreContentionExhausted {
        attempts: retry_cfg.max_retries + 1,
        source,
    })
}

/// Stage 2. Classifies `prepared` against the index and commits the
/// result. Must be called from a single thread per `store`.
pub fn commit_file(
    store: &Store,
    prepared: &PreparedFile,
    cfg: &IngestConfigs,
    min_ocr_quality: f64,
    artifacts_dir: Option<&Path>,
) -> Result<CommitOutcome, CommitError> {
    let file_path_str = prepared.file_path.to_string_lossy().to_string();
    let incoming = &prepared.incoming;

    let candidate_text = load_candidate_text(store, incoming, artifacts_dir, cfg.dedup.skip_fuzzy);

    let outcome = dedup::classify(store, incoming, &candidate_text, &cfg.dedup)
        .map_err(|e| file_error(&file_path_str, FileErrorKind::Dedup, e.to_string()))?;

    for warning in &outcome.warnings {
        tracing::warn!(source = %incoming.source.source_name, %warning, "dedup classifier warning");
        let _ = store.append_log(&ProcessingLogEntry {
            timestamp: chrono::Utc::now(),
            operation: "classify".to_string(),
            source: incoming.source.source_name.clone(),
            status: LogStatus::Warning,
            message: warning.clone(),
            details_json: serde_json::json!({ "file_path": file_path_str }),
        });
    }

    match outcome.classification {
        dedup::Classification::NewCanonical => {
            let canonical_id = incoming.source.content_hash.clone();
            let now = chrono::Utc::now();
            let document = CanonicalDocument {
                canonical_id: canonical_id.clone(),
                content_hash: incoming.source.content_hash.clone(),
                file_hash: incoming.source.file_hash.clone(),
                document_type: incoming.metadata.document_type,
                title: incoming.metadata.title.clone(),
                date: incoming.metadata.date.clone(),
                metadata_fields: incoming.metadata.fields.clone(),
                ocr_quality: incoming.source.ocr_quality,
                has_redactions: incoming.source.has_redactions,
                completeness: incoming.source.completeness,
                page_count: incoming.source.page_count,
                primary_source: incoming.source.clone(),
                selection_reason: "sole known source".to_string(),
                sources: vec![incoming.source.clone()],
                fuzzy_hash: incoming.source.fuzzy_hash.clone(),
                per_page_hashes: incoming.source.per_page_hashes.clone(),
                created_at: now,
                updated_at: now,
            };

            let log_entry = ProcessingLogEntry {
                timestamp: now,
                operation: "ingest".to_string(),
                source: incoming.source.source_name.clone(),
                status: LogStatus::Ok,
                message: format!("new canonical {canonical_id}"),
                details_json: serde_json::json!({ "file_path": file_path_str }),
            };

            commit_with_retry(|| {
                store.commit_new_canonical(
                    &document,
                    dedup::metadata_sig_key(incoming).as_deref(),
                    &log_entry,
                )
            })
            .map_err(CommitError::Fatal)?;
            tracing::debug!(%canonical_id, file = %file_path_str, "committed new canonical");

            if let Some(dir) = artifacts_dir {
                write_artifact(dir, &document, &incoming.normalized_text)
                    .map_err(|e| file_error(&file_path_str, FileErrorKind::Artifact, e.to_string()))?;
            }

            let partial_overlaps =
                record_partial_overlaps(store, incoming, Some(&canonical_id), &cfg.dedup, &file_path_str)?;

            Ok(CommitOutcome::New {
                low_quality: incoming.source.ocr_quality < min_ocr_quality,
                canonical_id,
                partial_overlaps,
            })
        }
        dedup::Classification::AttachExisting {
            canonical_id,
            duplicate_type,
            similarity_score,
            detection_method,
        } => {
            let mut existing = store
                .get_canonical(&canonical_id)
                .map_err(|e| file_error(&file_path_str, FileErrorKind::IntegrityViolation, e.to_string()))?
                .ok_or_else(|| {
                    file_error(
                        &file_path_str,
                        FileErrorKind::IntegrityViolation,
                        format!("classifier matched canonical {canonical_id} but it is missing from the store"),
                    )
                })?;

            existing.sources.push(incoming.source.clone());
            let (primary_idx, reason) = selector::select_primary(&existing.sources, &cfg.selector)
                .map_err(|e| file_error(&file_path_str, FileErrorKind::Selection, e.to_string()))?;
            let primary = existing.sources[primary_idx].clone();

            existing.primary_source = primary.clone();
            existing.selection_reason = reason;
            existing.ocr_quality = primary.ocr_quality;
            existing.has_redactions = primary.has_redactions;
            existing.completeness = primary.completeness;
            existing.page_count = primary.page_count;
            existing.fuzzy_hash = primary.fuzzy_hash.clone();
            existing.per_page_hashes = primary.per_page_hashes.clone();
            existing.updated_at = chrono::Utc::now();

            let duplicate_group = DuplicateGroup {
                canonical_id: canonical_id.clone(),
                duplicate_type,
                similarity_score,
                detection_method,
                detected_at: existing.updated_at,
            };
            let log_entry = ProcessingLogEntry {
                timestamp: existing.updated_at,
                operation: "ingest".to_string(),
                source: incoming.source.source_name.clone(),
                status: LogStatus::Ok,
                message: format!("attached to canonical {canonical_id} via {detection_method:?}"),
                details_json: serde_json::json!({ "file_path": file_path_str }),
            };

            commit_with_retry(|| store.commit_attach(&existing, &incoming.source, &duplicate_group, &log_entry))
                .map_err(CommitError::Fatal)?;
            tracing::debug!(%canonical_id, file = %file_path_str, ?detection_method, "attached source to existing canonical");

            // Only the just-arrived source's normalized text is in memory —
            // re-render the artifact when it just won selection, and leave
            // an existing artifact untouched otherwise rather than rewrite
            // it with stale or absent text.
            if let Some(dir) = artifacts_dir {
                if existing.primary_source.source_name == incoming.source.source_name
                    && existing.primary_source.file_path == incoming.source.file_path
                {
                    write_artifact(dir, &existing, &incoming.normalized_text)
                        .map_err(|e| file_error(&file_path_str, FileErrorKind::Artifact, e.to_string()))?;
                }
            }

            let partial_overlaps =
                record_partial_overlaps(store, incoming, Some(&canonical_id), &cfg.dedup, &file_path_str)?;

            Ok(CommitOutcome::Attached { canonical_id, partial_overlaps })
        }
    }
}

/// Run the orthogonal partial-overlap pass and
/// persist any hits, independent of whatever the first-match-wins
/// classification above decided.
fn record_partial_overlaps(
    store: &Store,
    incoming: &IncomingDocument,
    exclude: Option<&CanonicalId>,
    cfg: &DedupConfig,
    file_path_str: &str,
) -> Result<usize, CommitError> {
    let candidates = dedup::find_partial_overlaps(store, incoming, exclude, cfg)
        .map_err(|e| file_error(file_path_str, FileErrorKind::Dedup, e.to_string()))?;

    let incoming_id = incoming.source.content_hash.clone();
    let mut recorded = 0;
    for candidate in candidates {
        let overlap = index::PartialOverlap {
            doc_a_id: incoming_id.clone(),
            doc_b_id: candidate.other_canonical_id,
            overlap_percentage_a: candidate.overlap_percentage_incoming,
            overlap_percentage_b: candidate.overlap_percentage_other,
            pages_a: candidate.pages_incoming,
            pages_b: candidate.pages_other,
            detected_at: chrono::Utc::now(),
        };
        commit_with_retry(|| store.commit_partial_overlap(&overlap)).map_err(CommitError::Fatal)?;
        recorded += 1;
    }
    Ok(recorded)
}

/// Recover document text for hashing, quality assessment, and metadata
/// extraction.
///
/// OCR/PDF text extraction is out of scope for this engine:
/// `Txt`/`Markdown` files are read directly as UTF-8. Every
/// other format looks for a sibling `.txt` file with the same stem,
/// treating it as externally-produced OCR output (the common shape of the
/// source collections this engine ingests — see `crate::discover`);
/// lacking that, the raw bytes are decoded lossily so the file can still
/// be hashed and scored rather than rejected outright.
fn extract_text(path: &Path, format: SourceFormat, bytes: &[u8]) -> Result<String, String> {
    match format {
        SourceFormat::Txt | SourceFormat::Markdown => Ok(String::from_utf8_lossy(bytes).into_owned()),
        _ => {
            if let Some(sidecar) = sidecar_text_path(path) {
                if sidecar.is_file() {
                    return std::fs::read_to_string(&sidecar)
                        .map_err(|e| format!("reading OCR sidecar {}: {e}", sidecar.display()));
                }
            }
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Split already-extracted text into pages on form-feed characters
/// (`\x0c`), the convention most OCR/PDF-text-extraction tools use to mark
/// page boundaries. Text with no form feeds is treated as a single page.
fn split_pages(text: &str) -> Vec<String> {
    if !text.contains(FORM_FEED) {
        return vec![text.to_string()];
    }
    text.split(FORM_FEED).map(|s| s.to_string()).collect()
}

fn page_range(page_count: usize) -> Option<String> {
    if page_count == 0 {
        None
    } else {
        Some(format!("1-{page_count}"))
    }
}

fn file_error(file_path: &str, kind: FileErrorKind, message: String) -> FileError {
    FileError {
        file_path: file_path.to_string(),
        kind,
        message,
    }
}

fn io_error(file_path: &str, message: String) -> FileError {
    file_error(file_path, FileErrorKind::Io, message)
}
