//! `query stats`: aggregate counts over the whole index.

use std::collections::HashMap;

use index::Store;
use metadata::DocumentType;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stats {
    pub canonical_count: usize,
    pub source_count: usize,
    pub duplicate_group_count: usize,
    pub partial_overlap_count: usize,
    /// Mean `ocr_quality` across every canonical's current primary source;
    /// `0.0` for an empty store.
    pub mean_ocr_quality: f64,
    pub by_document_type: HashMap<DocumentType, usize>,
}

pub fn stats(store: &Store) -> Result<Stats, QueryError> {
    let canonicals = store.scan_canonicals()?;
    let duplicate_groups = store.scan_duplicate_groups()?;
    let partial_overlaps = store.scan_partial_overlaps()?;

    let source_count: usize = canonicals.iter().map(|doc| doc.sources.len()).sum();
    let mean_ocr_quality = if canonicals.is_empty() {
        0.0
    } else {
        canonicals.iter().map(|doc| doc.ocr_quality).sum::<f64>() / canonicals.len() as f64
    };

    let mut by_document_type: HashMap<DocumentType, usize> = HashMap::new();
    for doc in &canonicals {
        *by_document_type.entry(doc.document_type).or_insert(0) += 1;
    }

    Ok(Stats {
        canonical_count: canonicals.len(),
        source_count,
        duplicate_group_count: duplicate_groups.len(),
        partial_overlap_count: partial_overlaps.len(),
        mean_ocr_quality,
        by_document_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_store_reports_zeroed_stats() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("index.redb")).unwrap();
        let s = stats(&store).unwrap();
        assert_eq!(s.canonical_count, 0);
        assert_eq!(s.mean_ocr_quality, 0.0);
    }
}
