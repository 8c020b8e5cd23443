//! Canonical output artifact: one `.md` file per [`index::CanonicalDocument`],
//! organized by `document_type` and `date`.
//!
//! The file is a structured `key: value` header block, a `---` separator,
//! then the normalized text body. The header schema is versioned and
//! stable: unknown keys present on read (e.g. written by a newer engine
//! version) are preserved round-trip rather than dropped, so this writer
//! never silently destroys forward-compatible data it doesn't understand.

mod error;
mod storage;

pub use crate::error::ArtifactError;
pub use crate::storage::{document_type_dir, storage_path};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use index::{CanonicalDocument, DocumentSource};
use serde_json::Value;

/// Current header schema version. Bump whenever a key is added, removed, or
/// changes meaning.
pub const HEADER_VERSION: u32 = 1;

const SEPARATOR: &str = "---";

/// Serialize `document` to the canonical-file format and write it to
/// `{root_dir}/{document_type}/{year}/{canonical_id}.md`, creating parent
/// directories as needed.
pub fn write_artifact(
    root_dir: &Path,
    document: &CanonicalDocument,
    body: &str,
) -> Result<std::path::PathBuf, ArtifactError> {
    let path = storage_path(
        root_dir,
        document.document_type,
        document.date.as_deref(),
        &document.canonical_id,
    );
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ArtifactError::Write {
            path: path.clone(),
            source,
        })?;
    }
    let rendered = render(document, body, &BTreeMap::new());
    fs::write(&path, rendered).map_err(|source| ArtifactError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Render `document` into the header+body text without touching the
/// filesystem (used directly by tests and by [`write_artifact`]).
///
/// `extra_keys` carries forward any header keys this version of the writer
/// does not itself produce but which round-trip parsing found on a prior
/// read — see [`read_artifact`].
pub fn render(document: &CanonicalDocument, body: &str, extra_keys: &BTreeMap<String, Value>) -> String {
    let mut header = Vec::new();
    header.push(kv("canonical_id", &document.canonical_id));
    header.push(kv("document_type", &format!("{:?}", document.document_type).to_lowercase()));
    header.push(kv_opt("title", document.title.as_deref()));
    header.push(kv_opt("date", document.date.as_deref()));
    header.push(kv_sources(&document.sources));
    header.push(kv_metadata_fields(document));
    header.push(kv_num("duplicates_found", document.sources.len().saturating_sub(1)));
    header.push(kv("primary_source", &document.primary_source.source_name));
    header.push(kv("selection_reason", &document.selection_reason));
    header.push(kv("content_hash", &document.content_hash));
    header.push(kv("file_hash", &document.file_hash));
    header.push(kv("fuzzy_hash", &document.fuzzy_hash));
    header.push(kv_num_f64("ocr_quality", document.ocr_quality));
    header.push(kv_bool("redactions", document.has_redactions));
    header.push(kv("completeness", &format!("{:?}", document.completeness).to_lowercase()));
    header.push(kv_num("page_count", document.page_count as usize));
    header.push(kv_num("file_size", document.primary_source.file_size as usize));
    header.push(kv(
        "format",
        &format!("{:?}", document.primary_source.format).to_lowercase(),
    ));
    header.push(kv("extracted_at", &document.updated_at.to_rfc3339()));
    header.push(kv_num("version", HEADER_VERSION as usize));

    for (key, value) in extra_keys {
        header.push(format!("{key}: {value}"));
    }

    format!("{}\n{SEPARATOR}\n{}", header.join("\n"), body)
}

fn kv(key: &str, value: &str) -> String {
    format!("{key}: {value}")
}

fn kv_opt(key: &str, value: Option<&str>) -> String {
    format!("{key}: {}", value.unwrap_or("null"))
}

fn kv_bool(key: &str, value: bool) -> String {
    format!("{key}: {value}")
}

fn kv_num(key: &str, value: usize) -> String {
    format!("{key}: {value}")
}

fn kv_num_f64(key: &str, value: f64) -> String {
    format!("{key}: {value:.4}")
}

fn kv_sources(sources: &[DocumentSource]) -> String {
    let rendered: Vec<Value> = sources
        .iter()
        .map(|s| {
            serde_json::json!({
                "source_name": s.source_name,
                "url": s.source_url,
                "download_date": s.download_date.to_rfc3339(),
                "pages": s.pages,
                "collection": s.collection,
                "quality_score": s.quality_score,
            })
        })
        .collect();
    format!("sources: {}", Value::Array(rendered))
}

fn kv_metadata_fields(document: &CanonicalDocument) -> String {
    let value = serde_json::to_value(&document.metadata_fields).unwrap_or(Value::Null);
    format!("metadata_fields: {value}")
}

/// Parsed header block plus body, as read back off disk.
pub struct ParsedArtifact {
    /// Every header key in file order, value as a raw JSON-ish scalar
    /// (strings are not quoted in this format, so scalars parse as strings
    /// unless they round-trip through `serde_json` cleanly).
    pub header: BTreeMap<String, Value>,
    pub body: String,
}

/// Parse a canonical-file artifact back into its header map and body.
/// Unknown keys are preserved in [`ParsedArtifact::header`] rather than
/// discarded, so a future schema version's extra fields round-trip through
/// an older reader untouched.
pub fn read_artifact(path: &Path) -> Result<ParsedArtifact, ArtifactError> {
    let contents = fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, path)
}

fn parse(contents: &str, path: &Path) -> Result<ParsedArtifact, ArtifactError> {
    let Some(sep_pos) = contents.find(&format!("\n{SEPARATOR}\n")) else {
        return Err(ArtifactError::MissingSeparator);
    };
    let header_block = &contents[..sep_pos];
    let body = contents[sep_pos + SEPARATOR.len() + 2..].to_string();

    let mut header = BTreeMap::new();
    for line in header_block.lines() {
        let Some((key, raw_value)) = line.split_once(": ") else {
            return Err(ArtifactError::MalformedHeader {
                path: path.to_path_buf(),
                reason: format!("line has no 'key: value' separator: {line:?}"),
            });
        };
        let value = serde_json::from_str::<Value>(raw_value)
            .unwrap_or_else(|_| Value::String(raw_value.to_string()));
        header.insert(key.to_string(), value);
    }
    Ok(ParsedArtifact { header, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use index::{SourceAuthority, SourceFormat};
    use metadata::{DocumentType, MetadataFields};
    use quality::Completeness;
    use tempfile::tempdir;

    fn sample_document() -> CanonicalDocument {
        let source = DocumentSource {
            source_name: "archive.org".to_string(),
            source_url: Some("https://archive.org/doc/1".to_string()),
            collection: "foia-batch-1".to_string(),
            download_date: Utc::now(),
            pages: Some("1-3".to_string()),
            file_path: "/in/a.pdf".to_string(),
            quality_score: 0.9,
            file_size: 4096,
            format: SourceFormat::Pdf,
            authority: SourceAuthority::GovernmentFoia,
            redaction_count: 0,
            has_redactions: false,
            ocr_quality: 0.92,
            completeness: Completeness::Complete,
            page_count: 3,
            file_hash: "filehash".to_string(),
            content_hash: "contenthash".to_string(),
            fuzzy_hash: "3:abcdefg:abcdefg".to_string(),
            per_page_hashes: vec!["p1".to_string(), "p2".to_string(), "p3".to_string()],
        };
        CanonicalDocument {
            canonical_id: "contenthash".to_string(),
            content_hash: source.content_hash.clone(),
            file_hash: source.file_hash.clone(),
            document_type: DocumentType::Letter,
            title: Some("A letter".to_string()),
            date: Some("2012-01-01".to_string()),
            metadata_fields: MetadataFields::None,
            ocr_quality: source.ocr_quality,
            has_redactions: false,
            completeness: Completeness::Complete,
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
    fn writes_and_reads_back_expected_path() {
        let dir = tempdir().unwrap();
        let doc = sample_document();
        let path = write_artifact(dir.path(), &doc, "The body text.").unwrap();
        assert_eq!(
            path,
            dir.path().join("letter").join("2012").join("contenthash.md")
        );
        let parsed = read_artifact(&path).unwrap();
        assert_eq!(parsed.body, "The body text.");
        assert_eq!(
            parsed.header.get("canonical_id").and_then(Value::as_str),
            Some("contenthash")
        );
    }

    #[test]
    fn unknown_header_keys_round_trip() {
        let contents = format!(
            "canonical_id: abc\nfuture_field: 42\n{SEPARATOR}\nbody here"
        );
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("x.md");
        fs::write(&path, &contents).unwrap();
        let parsed = read_artifact(&path).unwrap();
        assert_eq!(parsed.header.get("future_field"), Some(&Value::from(42)));
        assert_eq!(parsed.body, "body here");
    }

    #[test]
    fn missing_separator_is_an_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("bad.md");
        fs::write(&path, "canonical_id: abc\nno separator here").unwrap();
        let result = read_artifact(&path);
        assert!(matches!(result, Err(ArtifactError::MissingSeparator)));
    }
}
