//! The redb-backed multi-table index.
//!
//! One `redb` table per entity plus a handful of secondary-index tables
//! that make the deduplicator's lookups (`lookup_by_file_hash`,
//! `candidates_by_fuzzy_blocksize`, ...) direct key reads instead of full
//! scans. All of a single file's ingest-time writes — creating or
//! attaching to a canonical, recording duplicate/overlap rows, appending
//! the log entry — go through one `redb` write transaction, so a crash or
//! early return leaves the store exactly as it was before that file was
//! processed.
//!
//! The store assumes a single writer: `Store::open` takes an
//! exclusive sentinel-file lock next to the database file and refuses to
//! open if one is already held, rather than relying on `redb`'s own
//! locking (which only guards against concurrent *processes*, not
//! concurrent logical writers within this engine's restart model).

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, TableDefinition};

use crate::error::IndexError;
use crate::types::{
    CanonicalDocument, CanonicalId, DuplicateGroup, PartialOverlap, ProcessingLogEntry,
};

const CANONICAL_DOCUMENTS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("canonical_documents");
const BY_FILE_HASH: TableDefinition<&str, &str> = TableDefinition::new("by_file_hash");
const BY_CONTENT_HASH: TableDefinition<&str, &str> = TableDefinition::new("by_content_hash");
const BY_METADATA_SIG: TableDefinition<&str, &str> = TableDefinition::new("by_metadata_sig");
const BY_FUZZY_BLOCKSIZE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("by_fuzzy_blocksize");
const BY_PAGE_HASH: TableDefinition<&str, &[u8]> = TableDefinition::new("by_page_hash");
const BY_SOURCE_COLLECTION: TableDefinition<&str, &[u8]> =
    TableDefinition::new("by_source_collection");
const PROCESSED_SOURCES: TableDefinition<&str, &str> = TableDefinition::new("processed_sources");
const DUPLICATE_GROUPS: TableDefinition<u64, &[u8]> = TableDefinition::new("duplicate_groups");
const PARTIAL_OVERLAPS: TableDefinition<u64, &[u8]> = TableDefinition::new("partial_overlaps");
const PROCESSING_LOG: TableDefinition<u64, &[u8]> = TableDefinition::new("processing_log");
const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, IndexError> {
    let raw = bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(IndexError::encoding)?;
    zstd::encode_all(raw.as_slice(), 0).map_err(IndexError::encoding)
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, IndexError> {
    let raw = zstd::decode_all(bytes).map_err(IndexError::encoding)?;
    let (value, _) = bincode::serde::decode_from_slice(&raw, bincode::config::standard())
        .map_err(IndexError::encoding)?;
    Ok(value)
}

fn source_collection_key(source_name: &str, collection: &str) -> String {
    format!("{source_name}\0{collection}")
}

fn processed_key(source_name: &str, file_path: &str) -> String {
    format!("{source_name}\0{file_path}")
}

/// Append `id` to the `Vec<CanonicalId>` stored at `key` in `table`, unless
/// it is already present.
fn push_id_index(
    table: &mut redb::Table<&str, &[u8]>,
    key: &str,
    id: &CanonicalId,
) -> Result<(), IndexError> {
    let mut ids: Vec<CanonicalId> = match table.get(key).map_err(IndexError::backend)? {
        Some(guard) => decode(guard.value())?,
        None => Vec::new(),
    };
    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.clone());
        table
            .insert(key, encode(&ids)?.as_slice())
            .map_err(IndexError::backend)?;
    }
    Ok(())
}


/// Exclusive-lock sentinel file. Held for the lifetime of the [`Store`];
/// removed on drop so a later `Store::open` can succeed.
struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    fn acquire(db_path: &Path) -> Result<Self, IndexError> {
        let path = db_path.with_extension("lock");
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|_| IndexError::AlreadyLocked {
                path: path.display().to_string(),
            })?;
        Ok(StoreLock { path })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// A single open handle onto the canonicalization engine's persistent
/// index. One writer at a time; many readers may open the same `redb`
/// file concurrently for `query`-style access, but only after
/// the writer's `Store` has been dropped, releasing the sentinel lock.
pub struct Store {
    db: Database,
    _lock: StoreLock,
}

impl Store {
    /// Open (creating if absent) the index at `path`, taking the exclusive
    /// writer lock. Fails with [`IndexError::AlreadyLocked`] if another
    /// `Store` already holds it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let lock = StoreLock::acquire(path)?;
        let db = Database::create(path).map_err(IndexError::backend)?;
        {
            let txn = db.begin_write().map_err(IndexError::backend)?;
            txn.open_table(CANONICAL_DOCUMENTS)
                .map_err(IndexError::backend)?;
            txn.open_table(BY_FILE_HASH).map_err(IndexError::backend)?;
            txn.open_table(BY_CONTENT_HASH)
                .map_err(IndexError::backend)?;
            txn.open_table(BY_METADATA_SIG)
                .map_err(IndexError::backend)?;
            txn.open_table(BY_FUZZY_BLOCKSIZE)
                .map_err(IndexError::backend)?;
            txn.open_table(BY_PAGE_HASH).map_err(IndexError::backend)?;
            txn.open_table(BY_SOURCE_COLLECTION)
                .map_err(IndexError::backend)?;
            txn.open_table(PROCESSED_SOURCES)
                .map_err(IndexError::backend)?;
            txn.open_table(DUPLICATE_GROUPS)
                .map_err(IndexError::backend)?;
            txn.open_table(PARTIAL_OVERLAPS)
                .map_err(IndexError::backend)?;
            txn.open_table(PROCESSING_LOG)
                .map_err(IndexError::backend)?;
            txn.open_table(COUNTERS).map_err(IndexError::backend)?;
            txn.commit().map_err(IndexError::backend)?;
        }
        Ok(Store { db, _lock: lock })
    }

    // ---- read-only lookups ----

    pub fn get_canonical(&self, id: &CanonicalId) -> Result<Option<CanonicalDocument>, IndexError> {
        let txn = self.db.begin_read().map_err(IndexError::backend)?;
        let table = txn
            .open_table(CANONICAL_DOCUMENTS)
            .map_err(IndexError::backend)?;
        match table.get(id.as_str()).map_err(IndexError::backend)? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn lookup_by_file_hash(&self, file_hash: &str) -> Result<Option<CanonicalId>, IndexError> {
        self.lookup_string_index(BY_FILE_HASH, file_hash)
    }

    pub fn lookup_by_content_hash(
        &self,
        content_hash: &str,
    ) -> Result<Option<CanonicalId>, IndexError> {
        self.lookup_string_index(BY_CONTENT_HASH, content_hash)
    }

    /// `sig_key` is the caller-serialized form of a `metadata::EmailSignature`
    /// (the deduplicator owns the serialization so the index need not depend
    /// on the `metadata` crate's signature type directly for this lookup).
    pub fn lookup_by_metadata_sig(&self, sig_key: &str) -> Result<Option<CanonicalId>, IndexError> {
        self.lookup_string_index(BY_METADATA_SIG, sig_key)
    }

    fn lookup_string_index(
        &self,
        table_def: TableDefinition<&str, &str>,
        key: &str,
    ) -> Result<Option<CanonicalId>, IndexError> {
        let txn = self.db.begin_read().map_err(IndexError::backend)?;
        let table = txn.open_table(table_def).map_err(IndexError::backend)?;
        Ok(table
            .get(key)
            .map_err(IndexError::backend)?
            .map(|guard| guard.value().to_string()))
    }

    /// Canonicals whose fuzzy hash was spamsum-split at `blocksize`. The
    /// deduplicator is expected to also probe `blocksize / 2` and
    /// `blocksize * 2`, since `ssdeep`-compatible comparison only ever
    /// scores hashes computed at the same or an adjacent block size.
    pub fn candidates_by_fuzzy_blocksize(
        &self,
        blocksize: u32,
    ) -> Result<Vec<CanonicalDocument>, IndexError> {
        let txn = self.db.begin_read().map_err(IndexError::backend)?;
        let table = txn
            .open_table(BY_FUZZY_BLOCKSIZE)
            .map_err(IndexError::backend)?;
        let ids: Vec<CanonicalId> = match table
            .get(blocksize.to_string().as_str())
            .map_err(IndexError::backend)?
        {
            Some(guard) => decode(guard.value())?,
            None => Vec::new(),
        };
        let docs_table = txn
            .open_table(CANONICAL_DOCUMENTS)
            .map_err(IndexError::backend)?;
        let mut documents = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(guard) = docs_table.get(id.as_str()).map_err(IndexError::backend)? {
                documents.push(decode(guard.value())?);
            }
        }
        Ok(documents)
    }

    /// Canonicals sharing at least one page hash with `page_hash` — the
    /// partial-overlap candidate set.
    pub fn candidates_by_page_hash(&self, page_hash: &str) -> Result<Vec<CanonicalId>, IndexError> {
        let txn = self.db.begin_read().map_err(IndexError::backend)?;
        let table = txn
            .open_table(BY_PAGE_HASH)
            .map_err(IndexError::backend)?;
        match table.get(page_hash).map_err(IndexError::backend)? {
            Some(guard) => decode(guard.value()),
            None => Ok(Vec::new()),
        }
    }

    pub fn canonicals_in_collection(
        &self,
        source_name: &str,
        collection: &str,
    ) -> Result<Vec<CanonicalId>, IndexError> {
        let txn = self.db.begin_read().map_err(IndexError::backend)?;
        let table = txn
            .open_table(BY_SOURCE_COLLECTION)
            .map_err(IndexError::backend)?;
        let key = source_collection_key(source_name, collection);
        match table.get(key.as_str()).map_err(IndexError::backend)? {
            Some(guard) => decode(guard.value()),
            None => Ok(Vec::new()),
        }
    }

    /// `Some(canonical_id)` if `(source_name, file_path)` was already
    /// ingested, supporting restart-without-reprocessing.
    pub fn already_processed(
        &self,
        source_name: &str,
        file_path: &str,
    ) -> Result<Option<CanonicalId>, IndexError> {
        let txn = self.db.begin_read().map_err(IndexError::backend)?;
        let table = txn
            .open_table(PROCESSED_SOURCES)
            .map_err(IndexError::backend)?;
        Ok(table
            .get(processed_key(source_name, file_path).as_str())
            .map_err(IndexError::backend)?
            .map(|guard| guard.value().to_string()))
    }

    // ---- writes ----

    /// Create a brand-new canonical for a source with no match among any
    /// strategy, indexing it under every secondary index, marking its
    /// `(source_name, file_path)` processed, and appending the log entry —
    /// all in one transaction.
    pub fn commit_new_canonical(
        &self,
        document: &CanonicalDocument,
        metadata_sig_key: Option<&str>,
        log_entry: &ProcessingLogEntry,
    ) -> Result<(), IndexError> {
        let txn = self.db.begin_write().map_err(IndexError::backend)?;
        {
            let mut docs = txn
                .open_table(CANONICAL_DOCUMENTS)
                .map_err(IndexError::backend)?;
            docs.insert(
                document.canonical_id.as_str(),
                encode(document)?.as_slice(),
            )
            .map_err(IndexError::backend)?;

            let mut by_file = txn.open_table(BY_FILE_HASH).map_err(IndexError::backend)?;
            by_file
                .insert(
                    document.primary_source.file_hash.as_str(),
                    document.canonical_id.as_str(),
                )
                .map_err(IndexError::backend)?;

            let mut by_content = txn
                .open_table(BY_CONTENT_HASH)
                .map_err(IndexError::backend)?;
            by_content
                .insert(document.content_hash.as_str(), document.canonical_id.as_str())
                .map_err(IndexError::backend)?;

            if let Some(sig_key) = metadata_sig_key {
                let mut by_sig = txn
                    .open_table(BY_METADATA_SIG)
                    .map_err(IndexError::backend)?;
                by_sig
                    .insert(sig_key, document.canonical_id.as_str())
                    .map_err(IndexError::backend)?;
            }

            if let Some(blocksize) = fuzzy_blocksize(&document.fuzzy_hash) {
                let mut by_fuzzy = txn
                    .open_table(BY_FUZZY_BLOCKSIZE)
                    .map_err(IndexError::backend)?;
                push_id_index(
                    &mut by_fuzzy,
                    &blocksize.to_string(),
                    &document.canonical_id,
                )?;
            }

            let mut by_page = txn
                .open_table(BY_PAGE_HASH)
                .map_err(IndexError::backend)?;
            for page_hash in &document.per_page_hashes {
                push_id_index(&mut by_page, page_hash, &document.canonical_id)?;
            }

            let mut by_source_collection = txn
                .open_table(BY_SOURCE_COLLECTION)
                .map_err(IndexError::backend)?;
            push_id_index(
                &mut by_source_collection,
                &source_collection_key(
                    &document.primary_source.source_name,
                    &document.primary_source.collection,
                ),
                &document.canonical_id,
            )?;

            let mut processed = txn
                .open_table(PROCESSED_SOURCES)
                .map_err(IndexError::backend)?;
            processed
                .insert(
                    processed_key(
                        &document.primary_source.source_name,
                        &document.primary_source.file_path,
                    )
                    .as_str(),
                    document.canonical_id.as_str(),
                )
                .map_err(IndexError::backend)?;

            append_log_locked(&txn, log_entry)?;
        }
        txn.commit().map_err(IndexError::backend)?;
        Ok(())
    }

    /// Attach `source` to an existing canonical, replacing the stored
    /// document with `updated` (the selector's re-run over the full
    /// `sources` list, including any primary-source change), recording the
    /// `duplicate_group` row, marking `(source_name, file_path)` processed,
    /// and appending the log entry. One transaction.
    #[allow(clippy::too_many_arguments)]
    pub fn commit_attach(
        &self,
        updated: &CanonicalDocument,
        new_source: &crate::types::DocumentSource,
        duplicate_group: &DuplicateGroup,
        log_entry: &ProcessingLogEntry,
    ) -> Result<u64, IndexError> {
        let txn = self.db.begin_write().map_err(IndexError::backend)?;
        let group_id;
        {
            let mut docs = txn
                .open_table(CANONICAL_DOCUMENTS)
                .map_err(IndexError::backend)?;
            docs.insert(updated.canonical_id.as_str(), encode(updated)?.as_slice())
                .map_err(IndexError::backend)?;

            let mut by_file = txn.open_table(BY_FILE_HASH).map_err(IndexError::backend)?;
            by_file
                .insert(new_source.file_hash.as_str(), updated.canonical_id.as_str())
                .map_err(IndexError::backend)?;

            if let Some(blocksize) = fuzzy_blocksize(&new_source.fuzzy_hash) {
                let mut by_fuzzy = txn
                    .open_table(BY_FUZZY_BLOCKSIZE)
                    .map_err(IndexError::backend)?;
                push_id_index(&mut by_fuzzy, &blocksize.to_string(), &updated.canonical_id)?;
            }

            let mut by_page = txn
                .open_table(BY_PAGE_HASH)
                .map_err(IndexError::backend)?;
            for page_hash in &new_source.per_page_hashes {
                push_id_index(&mut by_page, page_hash, &updated.canonical_id)?;
            }

            let mut by_source_collection = txn
                .open_table(BY_SOURCE_COLLECTION)
                .map_err(IndexError::backend)?;
            push_id_index(
                &mut by_source_collection,
                &source_collection_key(&new_source.source_name, &new_source.collection),
                &updated.canonical_id,
            )?;

            let mut processed = txn
                .open_table(PROCESSED_SOURCES)
                .map_err(IndexError::backend)?;
            processed
                .insert(
                    processed_key(&new_source.source_name, &new_source.file_path).as_str(),
                    updated.canonical_id.as_str(),
                )
                .map_err(IndexError::backend)?;

            let mut counters = txn.open_table(COUNTERS).map_err(IndexError::backend)?;
            let id = next_counter(&mut counters, "duplicate_groups")?;
            let mut groups = txn
                .open_table(DUPLICATE_GROUPS)
                .map_err(IndexError::backend)?;
            groups
                .insert(id, encode(duplicate_group)?.as_slice())
                .map_err(IndexError::backend)?;
            group_id = id;

            append_log_locked(&txn, log_entry)?;
        }
        txn.commit().map_err(IndexError::backend)?;
        Ok(group_id)
    }

    /// Record a partial-overlap annotation between two existing canonicals.
    /// Never merges them and never touches either's `sources` list.
    pub fn commit_partial_overlap(&self, overlap: &PartialOverlap) -> Result<u64, IndexError> {
        let txn = self.db.begin_write().map_err(IndexError::backend)?;
        let id;
        {
            let mut counters = txn.open_table(COUNTERS).map_err(IndexError::backend)?;
            id = next_counter(&mut counters, "partial_overlaps")?;
            let mut overlaps = txn
                .open_table(PARTIAL_OVERLAPS)
                .map_err(IndexError::backend)?;
            overlaps
                .insert(id, encode(overlap)?.as_slice())
                .map_err(IndexError::backend)?;
        }
        txn.commit().map_err(IndexError::backend)?;
        Ok(id)
    }

    pub fn append_log(&self, entry: &ProcessingLogEntry) -> Result<u64, IndexError> {
        let txn = self.db.begin_write().map_err(IndexError::backend)?;
        let id = append_log_locked(&txn, entry)?;
        txn.commit().map_err(IndexError::backend)?;
        Ok(id)
    }

    /// Iterate every [`CanonicalDocument`] in insertion order, for the
    /// query interface's `export` and `stats` operations.
    pub fn scan_canonicals(&self) -> Result<Vec<CanonicalDocument>, IndexError> {
        let txn = self.db.begin_read().map_err(IndexError::backend)?;
        let table = txn
            .open_table(CANONICAL_DOCUMENTS)
            .map_err(IndexError::backend)?;
        table
            .iter()
            .map_err(IndexError::backend)?
            .map(|entry| {
                let (_, value) = entry.map_err(IndexError::backend)?;
                decode(value.value())
            })
            .collect()
    }

    pub fn scan_duplicate_groups(&self) -> Result<Vec<DuplicateGroup>, IndexError> {
        let txn = self.db.begin_read().map_err(IndexError::backend)?;
        let table = txn
            .open_table(DUPLICATE_GROUPS)
            .map_err(IndexError::backend)?;
        table
            .iter()
            .map_err(IndexError::backend)?
            .map(|entry| {
                let (_, value) = entry.map_err(IndexError::backend)?;
                decode(value.value())
            })
            .collect()
    }

    pub fn scan_partial_overlaps(&self) -> Result<Vec<PartialOverlap>, IndexError> {
        let txn = self.db.begin_read().map_err(IndexError::backend)?;
        let table = txn
            .open_table(PARTIAL_OVERLAPS)
            .map_err(IndexError::backend)?;
        table
            .iter()
            .map_err(IndexError::backend)?
            .map(|entry| {
                let (_, value) = entry.map_err(IndexError::backend)?;
                decode(value.value())
            })
            .collect()
    }

    pub fn scan_log(&self) -> Result<Vec<ProcessingLogEntry>, IndexError> {
        let txn = self.db.begin_read().map_err(IndexError::backend)?;
        let table = txn
            .open_table(PROCESSING_LOG)
            .map_err(IndexError::backend)?;
        table
            .iter()
            .map_err(IndexError::backend)?
            .map(|entry| {
                let (_, value) = entry.map_err(IndexError::backend)?;
                decode(value.value())
            })
            .collect()
    }
}

fn next_counter(table: &mut redb::Table<&str, u64>, name: &str) -> Result<u64, IndexError> {
    let current = table
        .get(name)
        .map_err(IndexError::backend)?
        .map(|guard| guard.value())
        .unwrap_or(0);
    let next = current + 1;
    table.insert(name, next).map_err(IndexError::backend)?;
    Ok(next)
}

fn append_log_locked(
    txn: &redb::WriteTransaction,
    entry: &ProcessingLogEntry,
) -> Result<u64, IndexError> {
    let mut counters = txn.open_table(COUNTERS).map_err(IndexError::backend)?;
    let id = next_counter(&mut counters, "processing_log")?;
    let mut log = txn
        .open_table(PROCESSING_LOG)
        .map_err(IndexError::backend)?;
    log.insert(id, encode(entry)?.as_slice())
        .map_err(IndexError::backend)?;
    Ok(id)
}

/// Extract the leading numeric block-size prefix from an `ssdeep`-style
/// signature (`"<blocksize>:<sig1>:<sig2>"`).
fn fuzzy_blocksize(fuzzy_hash: &str) -> Option<u32> {
    fuzzy_hash.split(':').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DocumentSource, SourceAuthority, SourceFormat};
    use chrono::Utc;
    use metadata::DocumentType;
    use quality::Completeness;
    use tempfile::tempdir;

    fn sample_source(name: &str, path: &str) -> DocumentSource {
        DocumentSource {
            source_name: name.to_string(),
            source_url: None,
            collection: "foia-batch-1".to_string(),
            download_date: Utc::now(),
            pages: Some("1-3".to_string()),
            file_path: path.to_string(),
            quality_score: 0.9,
            file_size: 1024,
            format: SourceFormat::Pdf,
            authority: SourceAuthority::GovernmentFoia,
            redaction_count: 0,
            has_redactions: false,
            ocr_quality: 0.92,
            completeness: Completeness::Complete,
            page_count: 3,
            file_hash: "filehash-a".to_string(),
            content_hash: "contenthash-a".to_string(),
            fuzzy_hash: "3:abcdefg:abcdefg".to_string(),
            per_page_hashes: vec!["page1".to_string(), "page2".to_string()],
        }
    }

    fn sample_document(id: &str, source: DocumentSource) -> CanonicalDocument {
        CanonicalDocument {
            canonical_id: id.to_string(),
            content_hash: source.content_hash.clone(),
            file_hash: source.file_hash.clone(),
            document_type: DocumentType::Letter,
            title: Some("A letter".to_string()),
            date: Some("2012-01-01".to_string()),
            metadata_fields: metadata::MetadataFields::None,
            ocr_quality: source.ocr_quality,
            has_redactions: source.has_redactions,
            completeness: source.completeness,
            page_count: source.page_count,
            primary_source: source.clone(),
            selection_reason: "only source".to_string(),
            sources: vec![source.clone()],
            fuzzy_hash: source.fuzzy_hash.clone(),
            per_page_hashes: source.per_page_hashes.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn create_then_lookup_round_trips() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("index.redb")).unwrap();
        let source = sample_source("archive.org", "/in/a.pdf");
        let doc = sample_document("contenthash-a", source.clone());
        let log = ProcessingLogEntry {
            timestamp: Utc::now(),
            operation: "ingest".to_string(),
            source: "archive.org".to_string(),
            status: crate::types::LogStatus::Ok,
            message: "new canonical".to_string(),
            details_json: serde_json::json!({}),
        };
        store.commit_new_canonical(&doc, None, &log).unwrap();

        assert_eq!(
            store.lookup_by_file_hash("filehash-a").unwrap(),
            Some("contenthash-a".to_string())
        );
        assert_eq!(
            store.lookup_by_content_hash("contenthash-a").unwrap(),
            Some("contenthash-a".to_string())
        );
        assert_eq!(
            store.already_processed("archive.org", "/in/a.pdf").unwrap(),
            Some("contenthash-a".to_string())
        );
        let fetched = store.get_canonical(&"contenthash-a".to_string()).unwrap();
        assert_eq!(fetched.unwrap().title.as_deref(), Some("A letter"));

        let candidates = store.candidates_by_fuzzy_blocksize(3).unwrap();
        assert_eq!(candidates.len(), 1);
        let by_page = store.candidates_by_page_hash("page1").unwrap();
        assert_eq!(by_page, vec!["contenthash-a".to_string()]);
    }

    #[test]
    fn second_open_while_locked_is_refused() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("index.redb");
        let _store = Store::open(&db_path).unwrap();
        let second = Store::open(&db_path);
        assert!(matches!(second, Err(IndexError::AlreadyLocked { .. })));
    }

    #[test]
    fn lock_is_released_on_drop() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("index.redb");
        {
            let _store = Store::open(&db_path).unwrap();
        }
        let reopened = Store::open(&db_path);
        assert!(reopened.is_ok());
    }

    #[test]
    fn attach_appends_duplicate_group_and_updates_document() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("index.redb")).unwrap();
        let source_a = sample_source("archive.org", "/in/a.pdf");
        let doc = sample_document("contenthash-a", source_a);
        let log = ProcessingLogEntry {
            timestamp: Utc::now(),
            operation: "ingest".to_string(),
            source: "archive.org".to_string(),
            status: crate::types::LogStatus::Ok,
            message: "new canonical".to_string(),
            details_json: serde_json::json!({}),
        };
        store.commit_new_canonical(&doc, None, &log).unwrap();

        let mut source_b = sample_source("muckrock", "/in/b.pdf");
        source_b.file_hash = "filehash-b".to_string();
        let mut updated = doc.clone();
        updated.sources.push(source_b.clone());
        updated.updated_at = Utc::now();

        let group = DuplicateGroup {
            canonical_id: "contenthash-a".to_string(),
            duplicate_type: crate::types::DuplicateType::Exact,
            similarity_score: 1.0,
            detection_method: crate::types::DetectionMethod::ContentHash,
            detected_at: Utc::now(),
        };
        let attach_log = ProcessingLogEntry {
            timestamp: Utc::now(),
            operation: "ingest".to_string(),
            source: "muckrock".to_string(),
            status: crate::types::LogStatus::Ok,
            message: "attached as duplicate".to_string(),
            details_json: serde_json::json!({}),
        };
        store
            .commit_attach(&updated, &source_b, &group, &attach_log)
            .unwrap();

        let fetched = store
            .get_canonical(&"contenthash-a".to_string())
            .unwrap()
            .unwrap();
        assert_eq!(fetched.sources.len(), 2);
        assert_eq!(store.scan_duplicate_groups().unwrap().len(), 1);
        assert_eq!(store.scan_log().unwrap().len(), 2);
        assert_eq!(
            store
                .already_processed("muckrock", "/in/b.pdf")
                .unwrap(),
            Some("contenthash-a".to_string())
        );
    }
}
