//! Document-type detection and structured field extraction.
//!
//! [`extract`] never fails: it returns the best-effort [`MetadataRecord`] it
//! can build from whatever signatures it finds in `text`, leaving fields it
//! cannot determine as `None` rather than guessing. Callers that already
//! know the document type (e.g. because the source collection is
//! email-only) can skip detection by passing a `document_type_hint`.

mod date;
mod error;
mod patterns;
mod signature;
mod types;

pub use crate::error::MetadataError;
pub use crate::signature::{metadata_signature, normalize_subject, EmailSignature};
pub use crate::types::{
    CourtFilingFields, DocumentType, EmailFields, FilingType, FinancialFields, MetadataFields,
    MetadataRecord,
};

/// Detect `document_type` (unless `hint` is given) and parse whatever
/// type-specific fields this extractor recognizes out of `text`.
pub fn extract(text: &str, hint: Option<DocumentType>) -> MetadataRecord {
    let document_type = hint.unwrap_or_else(|| detect_document_type(text));

    let fields = match document_type {
        DocumentType::Email => MetadataFields::Email(extract_email(text)),
        DocumentType::CourtFiling | DocumentType::Deposition | DocumentType::Subpoena => {
            MetadataFields::CourtFiling(extract_court_filing(text, document_type))
        }
        DocumentType::Invoice => MetadataFields::Financial(extract_financial(text)),
        _ => MetadataFields::None,
    };

    let date = match &fields {
        MetadataFields::Email(f) => f.date.clone(),
        MetadataFields::Financial(f) => f.transaction_date.clone(),
        _ => find_any_date(text),
    };

    let title = match &fields {
        MetadataFields::Email(f) => f.subject.clone(),
        _ => first_nonempty_line(text),
    };

    MetadataRecord {
        document_type,
        title,
        date,
        fields,
    }
}

fn detect_document_type(text: &str) -> DocumentType {
    let lower = text.to_lowercase();

    let looks_like_email = (lower.contains("from:") && lower.contains("to:"))
        || (lower.contains("subject:") && patterns::email_address().is_match(text));
    if looks_like_email {
        return DocumentType::Email;
    }
    if lower.contains("subpoena") {
        return DocumentType::Subpoena;
    }
    if lower.contains("deposition of") || lower.contains("deposition transcript") {
        return DocumentType::Deposition;
    }
    if lower.contains("case no")
        || lower.contains("docket no")
        || patterns::court_name().is_match(text)
    {
        return DocumentType::CourtFiling;
    }
    if lower.contains("invoice") || lower.contains("amount due") {
        return DocumentType::Invoice;
    }
    if lower.contains("flight log") || lower.contains("tail number") {
        return DocumentType::FlightLog;
    }
    if lower.contains("address book") {
        return DocumentType::AddressBook;
    }
    if lower.contains("federal bureau of investigation") || lower.contains("fd-302") {
        return DocumentType::FbiReport;
    }
    if lower.contains("memorandum") || lower.trim_start().starts_with("memo") {
        return DocumentType::Memo;
    }
    if lower.contains("dear ") {
        return DocumentType::Letter;
    }
    if text.trim().chars().count() < 500 {
        return DocumentType::Note;
    }
    DocumentType::Other
}

fn extract_email(text: &str) -> EmailFields {
    let from = patterns::from_header()
        .captures(text)
        .map(|c| c[1].trim().to_string());
    let to = split_addresses(
        patterns::to_header()
            .captures(text)
            .map(|c| c[1].to_string())
            .unwrap_or_default()
            .as_str(),
    );
    let cc = split_addresses(
        patterns::cc_header()
            .captures(text)
            .map(|c| c[1].to_string())
            .unwrap_or_default()
            .as_str(),
    );
    let subject = patterns::subject_header()
        .captures(text)
        .map(|c| c[1].trim().to_string());
    let date = patterns::date_header()
        .captures(text)
        .and_then(|c| date::try_normalize_date(&c[1]));
    let attachments = patterns::attachment_header()
        .captures(text)
        .map(|c| {
            c[1].split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    EmailFields {
        from,
        to,
        cc,
        subject,
        date,
        attachments,
    }
}

fn split_addresses(field: &str) -> Vec<String> {
    patterns::email_address()
        .find_iter(field)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn extract_court_filing(text: &str, document_type: DocumentType) -> CourtFilingFields {
    let case_number = patterns::case_number()
        .captures(text)
        .map(|c| c[1].trim().to_string());
    let court = patterns::court_name()
        .captures(text)
        .map(|c| c[2].trim().to_string());

    let lower = text.to_lowercase();
    let filing_type = match document_type {
        DocumentType::Deposition => Some(FilingType::Deposition),
        DocumentType::Subpoena => None,
        _ if lower.contains("exhibit") => Some(FilingType::Exhibit),
        _ if lower.contains("motion") => Some(FilingType::Motion),
        _ if lower.contains("deposition") => Some(FilingType::Deposition),
        _ if lower.contains("order") => Some(FilingType::Order),
        _ => None,
    };

    CourtFilingFields {
        case_number,
        court,
        filing_type,
    }
}

fn extract_financial(text: &str) -> FinancialFields {
    let amount = patterns::dollar_amount()
        .captures(text)
        .and_then(|c| c[1].replace(',', "").parse::<f64>().ok());
    let transaction_date = find_any_date(text);
    let account = patterns::account_number()
        .captures(text)
        .map(|c| c[1].trim().to_string());

    FinancialFields {
        amount,
        transaction_date,
        account,
    }
}

fn find_any_date(text: &str) -> Option<String> {
    patterns::date_header()
        .captures(text)
        .and_then(|c| date::try_normalize_date(&c[1]))
}

fn first_nonempty_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(|l| l.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMAIL_TEXT: &str = "From: Jane Doe <jane@example.com>\nTo: john@example.com, jack@example.com\nSubject: RE: Quarterly Report\nDate: Thu, 1 Apr 2010 09:00:00 -0400\n\nPlease see attached.";

    #[test]
    fn detects_and_parses_email() {
        let record = extract(EMAIL_TEXT, None);
        assert_eq!(record.document_type, DocumentType::Email);
        let MetadataFields::Email(fields) = &record.fields else {
            panic!("expected email fields");
        };
        assert_eq!(fields.from.as_deref(), Some("jane@example.com"));
        assert_eq!(
            fields.to,
            vec!["john@example.com".to_string(), "jack@example.com".to_string()]
        );
        assert_eq!(fields.subject.as_deref(), Some("RE: Quarterly Report"));
        assert_eq!(fields.date.as_deref(), Some("2010-04-01"));
        assert_eq!(record.date.as_deref(), Some("2010-04-01"));
    }

    #[test]
    fn hint_skips_detection() {
        let record = extract("no headers here at all", Some(DocumentType::Email));
        assert_eq!(record.document_type, DocumentType::Email);
    }

    #[test]
    fn detects_court_filing_case_number() {
        let text = "IN THE UNITED STATES DISTRICT COURT\nCase No. 10-CV-1234\n\nMOTION TO DISMISS";
        let record = extract(text, None);
        assert_eq!(record.document_type, DocumentType::CourtFiling);
        let MetadataFields::CourtFiling(fields) = &record.fields else {
            panic!("expected court filing fields");
        };
        assert_eq!(fields.case_number.as_deref(), Some("10-CV-1234"));
        assert_eq!(fields.filing_type, Some(FilingType::Motion));
    }

    #[test]
    fn detects_deposition() {
        let text = "DEPOSITION OF JOHN SMITH\nCase No. 99-123\nTaken before a certified reporter.";
        let record = extract(text, None);
        assert_eq!(record.document_type, DocumentType::Deposition);
    }

    #[test]
    fn detects_invoice_amount() {
        let text = "INVOICE\nAccount No: 55821\nAmount Due: $1,234.56\nDate: 2012-06-01";
        let record = extract(text, None);
        assert_eq!(record.document_type, DocumentType::Invoice);
        let MetadataFields::Financial(fields) = &record.fields else {
            panic!("expected financial fields");
        };
        assert_eq!(fields.amount, Some(1234.56));
        assert_eq!(fields.account.as_deref(), Some("55821"));
    }

    #[test]
    fn unmatched_fields_are_none_not_empty_strings() {
        let record = extract("INVOICE\nNo amount field here.", None);
        let MetadataFields::Financial(fields) = &record.fields else {
            panic!("expected financial fields");
        };
        assert_eq!(fields.amount, None);
        assert_eq!(fields.account, None);
    }

    #[test]
    fn never_panics_on_unparseable_input() {
        let _ = extract("", None);
        let _ = extract("\u{0}\u{1}\u{2} garbled ocr output \u{fffd}", None);
    }

    #[test]
    fn short_text_falls_back_to_note() {
        let record = extract("call me back", None);
        assert_eq!(record.document_type, DocumentType::Note);
    }
}
