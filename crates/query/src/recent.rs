//! `query recent N`: the `n` most recently updated canonicals.

use index::{CanonicalDocument, Store};

use crate::error::QueryError;

pub fn recent(store: &Store, n: usize) -> Result<Vec<CanonicalDocument>, QueryError> {
    let mut canonicals = store.scan_canonicals()?;
    canonicals.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    canonicals.truncate(n);
    Ok(canonicals)
}
