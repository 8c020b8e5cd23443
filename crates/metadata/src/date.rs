//! Best-effort date parsing into ISO-8601 (`YYYY-MM-DD`) strings.
//!
//! Source text comes from OCR and a long tail of human-typed formats, so
//! this tries a fixed list of formats rather than a single strict one.

use chrono::NaiveDate;

use crate::error::MetadataError;

const CANDIDATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
];

/// Parse `raw` into an ISO-8601 `YYYY-MM-DD` string, trying RFC 2822 first
/// (common in email `Date:` headers) and then a fixed list of plain-date
/// formats.
pub fn normalize_date(raw: &str) -> Result<String, MetadataError> {
    let trimmed = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc2822(trimmed) {
        return Ok(dt.format("%Y-%m-%d").to_string());
    }
    for fmt in CANDIDATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(date.format("%Y-%m-%d").to_string());
        }
    }
    Err(MetadataError::UnparseableDate(trimmed.to_string()))
}

/// [`normalize_date`], discarding the error — used everywhere inside
/// `extract` since the extractor itself never fails on unparseable input.
pub fn try_normalize_date(raw: &str) -> Option<String> {
    normalize_date(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date_unchanged() {
        assert_eq!(normalize_date("2010-04-01").unwrap(), "2010-04-01");
    }

    #[test]
    fn parses_us_slash_date() {
        assert_eq!(normalize_date("04/01/2010").unwrap(), "2010-04-01");
    }

    #[test]
    fn parses_long_form_date() {
        assert_eq!(normalize_date("April 1, 2010").unwrap(), "2010-04-01");
    }

    #[test]
    fn parses_rfc2822_email_date() {
        let got = normalize_date("Thu, 1 Apr 2010 09:00:00 -0400").unwrap();
        assert_eq!(got, "2010-04-01");
    }

    #[test]
    fn rejects_garbage() {
        assert!(normalize_date("not a date").is_err());
        assert!(try_normalize_date("not a date").is_none());
    }
}
