//! Compiled regex patterns used for document-type detection and field
//! extraction. Every pattern is compiled exactly once via `OnceLock` and
//! reused across calls to [`crate::extract`], matching the compile-once
//! convention this engine uses for other amortized setup (see
//! `quality::dictionary`).

use std::sync::OnceLock;

use regex::Regex;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        pub(crate) fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($re).expect("static regex is valid"))
        }
    };
}

pattern!(from_header, r"(?im)^from\s*:\s*(.+)$");
pattern!(to_header, r"(?im)^to\s*:\s*(.+)$");
pattern!(cc_header, r"(?im)^cc\s*:\s*(.+)$");
pattern!(subject_header, r"(?im)^subject\s*:\s*(.+)$");
pattern!(date_header, r"(?im)^date\s*:\s*(.+)$");
pattern!(attachment_header, r"(?im)^attach(?:ment)?s?\s*:\s*(.+)$");
pattern!(email_address, r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}");

pattern!(
    case_number,
    r"(?i)case\s*(?:no\.?|number)\s*[:#]?\s*([A-Za-z0-9\-:/]+)"
);
pattern!(
    court_name,
    r"(?i)(in\s+the\s+)?([A-Za-z][A-Za-z .]*?\bcourt\b[A-Za-z .]*)"
);

pattern!(dollar_amount, r"\$\s?([0-9][0-9,]*(?:\.[0-9]{2})?)");
pattern!(
    account_number,
    r"(?i)account\s*(?:no\.?|number)?\s*[:#]?\s*([A-Za-z0-9\-]+)"
);
