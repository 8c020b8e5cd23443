//! `query duplicates`: canonicals with two or more attached
//! sources, i.e. every duplicate group's equivalence class.

use index::{CanonicalId, Store};
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateSummary {
    pub canonical_id: CanonicalId,
    pub title: Option<String>,
    pub source_count: usize,
    pub source_names: Vec<String>,
}

/// Every canonical with two or more attached sources — a duplicate group.
pub fn duplicates(store: &Store) -> Result<Vec<DuplicateSummary>, QueryError> {
    let canonicals = store.scan_canonicals()?;
    Ok(canonicals
        .into_iter()
        .filter(|doc| doc.sources.len() >= 2)
        .map(|doc| DuplicateSummary {
            canonical_id: doc.canonical_id,
            title: doc.title,
            source_count: doc.sources.len(),
            source_names: doc.sources.iter().map(|s| s.source_name.clone()).collect(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_store_has_no_duplicates() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("index.redb")).unwrap();
        assert!(duplicates(&store).unwrap().is_empty());
    }
}
