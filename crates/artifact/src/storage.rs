//! Deterministic storage-path derivation for canonical-file artifacts.
//!
//! Mirrors the hash-prefixed content-addressed layout pattern used
//! elsewhere in this codebase for file storage, adapted to the
//! `{document_type}/{year}/{canonical_id}.md` type/year partitioning this
//! writer needs instead of a hash-prefix partitioning: readers browsing the
//! output tree want to find "all court filings from 2016", not a hash
//! bucket.

use std::path::PathBuf;

use metadata::DocumentType;

/// Directory segment for a [`DocumentType`], matching its `snake_case`
/// serde representation.
pub fn document_type_dir(document_type: DocumentType) -> &'static str {
    match document_type {
        DocumentType::Email => "email",
        DocumentType::CourtFiling => "court_filing",
        DocumentType::Memo => "memo",
        DocumentType::Invoice => "invoice",
        DocumentType::FlightLog => "flight_log",
        DocumentType::AddressBook => "address_book",
        DocumentType::FbiReport => "fbi_report",
        DocumentType::Deposition => "deposition",
        DocumentType::Letter => "letter",
        DocumentType::Subpoena => "subpoena",
        DocumentType::Note => "note",
        DocumentType::Other => "other",
    }
}

/// Four-digit year segment extracted from an ISO-8601 date string
/// (`"2010-04-01"` -> `"2010"`); `"unknown"` when `date` is absent or not
/// parseable as a leading four-digit year.
fn year_string(date: Option<&str>) -> String {
    match date {
        Some(d) if d.len() >= 4 && d.as_bytes()[..4].iter().all(u8::is_ascii_digit) => {
            d[..4].to_string()
        }
        _ => "unknown".to_string(),
    }
}

/// Build the deterministic relative path `{document_type}/{year}/{canonical_id}.md`
/// under `root_dir`.
pub fn storage_path(
    root_dir: &std::path::Path,
    document_type: DocumentType,
    date: Option<&str>,
    canonical_id: &str,
) -> PathBuf {
    root_dir
        .join(document_type_dir(document_type))
        .join(year_string(date))
        .join(format!("{canonical_id}.md"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn builds_expected_relative_path() {
        let path = storage_path(
            Path::new("/out"),
            DocumentType::Email,
            Some("2010-04-01"),
            "abc123",
        );
        assert_eq!(path, Path::new("/out/email/2010/abc123.md"));
    }

    #[test]
    fn missing_date_falls_back_to_unknown_year() {
        let path = storage_path(Path::new("/out"), DocumentType::Other, None, "abc123");
        assert_eq!(path, Path::new("/out/other/unknown/abc123.md"));
    }

    #[test]
    fn malformed_date_falls_back_to_unknown_year() {
        let path = storage_path(Path::new("/out"), DocumentType::Memo, Some("n/a"), "xyz");
        assert_eq!(path, Path::new("/out/memo/unknown/xyz.md"));
    }
}
