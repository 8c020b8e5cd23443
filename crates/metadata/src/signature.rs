//! Email metadata signature used by the deduplicator's metadata-match
//! strategy: `(from, sorted-set(to), date, subject)`,
//! all case- and whitespace-normalized so that two independently-OCR'd
//! copies of the same email produce the same signature.

use serde::{Deserialize, Serialize};

use crate::types::{EmailFields, MetadataFields, MetadataRecord};

const SUBJECT_PREFIXES: &[&str] = &["re:", "fwd:", "fw:"];

/// A comparable, order-independent signature for an email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EmailSignature {
    pub from: String,
    pub to: Vec<String>,
    pub date: Option<String>,
    pub subject: String,
}

/// Strip a leading chain of reply/forward prefixes (`Re:`, `Fwd:`, `FW:`,
/// case-insensitively, possibly repeated) and collapse whitespace, then
/// lowercase the remainder so two differently-cased copies of the same
/// subject compare equal.
pub fn normalize_subject(subject: &str) -> String {
    let mut rest = subject.trim();
    loop {
        let lower = rest.to_lowercase();
        let mut stripped = false;
        for prefix in SUBJECT_PREFIXES {
            if lower.starts_with(prefix) {
                rest = rest[prefix.len()..].trim_start();
                stripped = true;
                break;
            }
        }
        if !stripped {
            break;
        }
    }
    rest.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Build the metadata-match signature for `record`, or `None` if it is not
/// an email or lacks enough fields to form a meaningful signature.
pub fn metadata_signature(record: &MetadataRecord) -> Option<EmailSignature> {
    let MetadataFields::Email(EmailFields {
        from,
        to,
        subject,
        date,
        ..
    }) = &record.fields
    else {
        return None;
    };
    let from = from.as_ref()?.trim().to_lowercase();
    if from.is_empty() || to.is_empty() {
        return None;
    }
    let mut to: Vec<String> = to.iter().map(|a| a.trim().to_lowercase()).collect();
    to.sort();
    to.dedup();
    let subject = subject
        .as_deref()
        .map(normalize_subject)
        .unwrap_or_default();

    Some(EmailSignature {
        from,
        to,
        date: date.clone(),
        subject,
    })
}
