//! `query sources CID`: list every attached source of one
//! canonical.

use index::{CanonicalId, DocumentSource, Store};

use crate::error::QueryError;

pub fn sources(store: &Store, canonical_id: &CanonicalId) -> Result<Vec<DocumentSource>, QueryError> {
    let document = store
        .get_canonical(canonical_id)?
        .ok_or_else(|| QueryError::NotFound(canonical_id.clone()))?;
    Ok(document.sources)
}
