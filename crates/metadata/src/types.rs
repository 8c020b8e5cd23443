//! Data model for detected document types and the fields extracted from them.
//!
//! Each document family is modeled as its own variant struct inside
//! [`MetadataFields`] rather than an inheritance hierarchy or a single
//! struct-of-optionals: a court filing has no `subject`, an email has no
//! `case_number`, and collapsing them into one flat struct would make every
//! field look optional for no reason tied to the document itself.

use serde::{Deserialize, Serialize};

/// The logical kind of document, used both as a user-supplied hint to
/// [`crate::extract`] and as the detected result when no hint is given.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Email,
    CourtFiling,
    Memo,
    Invoice,
    FlightLog,
    AddressBook,
    FbiReport,
    Deposition,
    Letter,
    Subpoena,
    Note,
    Other,
}

impl Default for DocumentType {
    fn default() -> Self {
        DocumentType::Other
    }
}

/// The kind of court filing, when that can be determined.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilingType {
    Motion,
    Deposition,
    Exhibit,
    Order,
}

/// Fields parsed from an email header block.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailFields {
    pub from: Option<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: Option<String>,
    /// ISO-8601 date, when it could be parsed.
    pub date: Option<String>,
    pub attachments: Vec<String>,
}

/// Fields parsed from a court filing (motion, deposition, exhibit, order).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourtFilingFields {
    pub case_number: Option<String>,
    pub court: Option<String>,
    pub filing_type: Option<FilingType>,
}

/// Fields parsed from a financial document (invoice, transaction record).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinancialFields {
    /// Normalized numeric amount, e.g. `1234.56` parsed from `"$1,234.56"`.
    pub amount: Option<f64>,
    /// ISO-8601 date, when it could be parsed.
    pub transaction_date: Option<String>,
    pub account: Option<String>,
}

/// Document-type-specific fields, or `None` for types this extractor has no
/// dedicated parser for (memo, flight log, address book, fbi report, letter,
/// note, other).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MetadataFields {
    Email(EmailFields),
    CourtFiling(CourtFilingFields),
    Financial(FinancialFields),
    None,
}

/// Best-effort extraction result for one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataRecord {
    pub document_type: DocumentType,
    /// Best-effort title: the email subject, the first non-empty line, or
    /// `None` when nothing plausible was found.
    pub title: Option<String>,
    /// ISO-8601 date most representative of the document (email date,
    /// filing date, or transaction date), when one could be determined.
    pub date: Option<String>,
    pub fields: MetadataFields,
}
