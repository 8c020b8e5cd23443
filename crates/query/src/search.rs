//! `query search QUERY`: case-insensitive substring search over
//! each canonical's title and, for email documents, its subject line.

use index::{CanonicalDocument, Store};
use metadata::MetadataFields;

use crate::error::QueryError;

pub fn search(store: &Store, query: &str) -> Result<Vec<CanonicalDocument>, QueryError> {
    let needle = query.to_lowercase();
    let canonicals = store.scan_canonicals()?;
    Ok(canonicals
        .into_iter()
        .filter(|doc| matches(doc, &needle))
        .collect())
}

fn matches(doc: &CanonicalDocument, needle: &str) -> bool {
    if let Some(title) = &doc.title {
        if title.to_lowercase().contains(needle) {
            return true;
        }
    }
    if let MetadataFields::Email(email) = &doc.metadata_fields {
        if let Some(subject) = &email.subject {
            if subject.to_lowercase().contains(needle) {
                return true;
            }
        }
    }
    false
}
