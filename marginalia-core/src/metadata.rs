//! Per-paper metadata resolution
//!
//! Author, date and DOI come from up to three places, in fixed precedence:
//! the user's overwrite file, a previously persisted missing-fields ledger
//! entry, and the PDF's own info dictionary. Fields no source can provide are
//! recorded as `"missing"` in both the paper record and the ledger, so the
//! user can backfill them in the ledger file and have the next run pick the
//! value up.

use chrono::{Datelike, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::notes::Notes;

/// Sentinel value for fields no source could provide.
pub const MISSING: &str = "missing";

/// Raw document-level metadata as read from the PDF info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperMetadata {
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creation_date: Option<String>,
}

/// Publication month and year, or the missing sentinel.
///
/// Serialized untagged: `[month, year]` or `"missing"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaperDate {
    MonthYear(u32, i32),
    Missing(String),
}

impl PaperDate {
    pub fn missing() -> Self {
        PaperDate::Missing(MISSING.to_string())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, PaperDate::Missing(_))
    }
}

/// Resolved record of one paper, as persisted in the collection tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub author: String,
    pub date: PaperDate,
    pub doi: String,
    pub notes: Notes,
}

/// User-supplied field overrides for one paper, keyed by file stem in the
/// overwrite file. `name` replaces the derived display name of the paper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperOverride {
    pub name: Option<String>,
    pub author: Option<String>,
    pub date: Option<PaperDate>,
    pub doi: Option<String>,
}

/// The overwrite file: file stem → field overrides.
pub type Overrides = IndexMap<String, PaperOverride>;

/// Ledger slice of one paper: field name → `"missing"` or a backfilled value.
pub type PaperLedger = IndexMap<String, Value>;

/// The persisted missing-fields ledger: file stem → ledger slice.
pub type Ledger = IndexMap<String, PaperLedger>;

/// Errors of the metadata layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    /// A field appears for the same paper in the overwrite file and the
    /// ledger; the precedence between the two would be arbitrary.
    #[error(
        "the field '{field}' for paper '{paper}' is set from both the missing ledger and the \
         overwrite file; it must only be set by one"
    )]
    ConflictingFieldSource { paper: String, field: String },
}

/// Reject papers whose fields are set by both input files.
pub fn validate_sources(overrides: &Overrides, ledger: &Ledger) -> Result<(), MetadataError> {
    for (paper, fields) in overrides {
        let Some(recorded) = ledger.get(paper) else {
            continue;
        };
        let set = [
            ("author", fields.author.is_some()),
            ("date", fields.date.is_some()),
            ("doi", fields.doi.is_some()),
        ];
        for (field, overridden) in set {
            if overridden && recorded.contains_key(field) {
                return Err(MetadataError::ConflictingFieldSource {
                    paper: paper.clone(),
                    field: field.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Resolve author, date and DOI for one paper and update its ledger slice.
pub fn resolve_record(
    metadata: &PaperMetadata,
    overrides: &PaperOverride,
    ledger: &mut PaperLedger,
    notes: Notes,
) -> PaperRecord {
    let author = resolve_text_field(
        "author",
        overrides.author.as_deref(),
        ledger,
        metadata.author.as_deref(),
        |raw| raw.to_string(),
    );
    let date = resolve_date(
        overrides.date.as_ref(),
        ledger,
        metadata.creation_date.as_deref(),
    );
    let doi = resolve_text_field(
        "doi",
        overrides.doi.as_deref(),
        ledger,
        metadata.subject.as_deref(),
        extract_doi,
    );

    PaperRecord {
        author,
        date,
        doi,
        notes,
    }
}

/// Resolve one string-valued field. `extract` derives the value from the raw
/// PDF metadata string and may itself yield the missing sentinel (DOI).
fn resolve_text_field(
    field: &str,
    override_value: Option<&str>,
    ledger: &mut PaperLedger,
    raw: Option<&str>,
    extract: impl Fn(&str) -> String,
) -> String {
    if let Some(value) = override_value {
        return value.to_string();
    }

    if let Some(recorded) = ledger.get(field) {
        let value = match recorded.as_str() {
            Some(s) => s.to_string(),
            None => recorded.to_string(),
        };
        if value != MISSING {
            // the user backfilled the ledger entry; adopt and drop it
            ledger.shift_remove(field);
        }
        return value;
    }

    match raw {
        Some(raw) if !raw.is_empty() => {
            let value = extract(raw);
            if value == MISSING {
                ledger.insert(field.to_string(), Value::String(MISSING.to_string()));
            }
            value
        }
        _ => {
            ledger.insert(field.to_string(), Value::String(MISSING.to_string()));
            MISSING.to_string()
        }
    }
}

fn resolve_date(
    override_value: Option<&PaperDate>,
    ledger: &mut PaperLedger,
    raw: Option<&str>,
) -> PaperDate {
    if let Some(date) = override_value {
        return date.clone();
    }

    if let Some(recorded) = ledger.get("date") {
        if recorded.as_str() == Some(MISSING) {
            return PaperDate::missing();
        }
        match serde_json::from_value::<PaperDate>(recorded.clone()) {
            Ok(date) => {
                ledger.shift_remove("date");
                return date;
            }
            Err(_) => {
                tracing::warn!(value = %recorded, "unusable date in missing ledger, keeping it missing");
                return PaperDate::missing();
            }
        }
    }

    match raw {
        Some(raw) if !raw.is_empty() => {
            let (month, year) = extract_month_year(raw);
            PaperDate::MonthYear(month, year)
        }
        _ => {
            ledger.insert("date".to_string(), Value::String(MISSING.to_string()));
            PaperDate::missing()
        }
    }
}

/// Parse the `D:YYYYMMDDhhmmss` prefix of a PDF timestamp. Malformed input
/// degrades to `(1, 1)` instead of failing the run.
pub fn extract_month_year(date_str: &str) -> (u32, i32) {
    let date_str = date_str.strip_prefix("D:").unwrap_or(date_str);
    let prefix: String = date_str.chars().take(14).collect();
    match NaiveDateTime::parse_from_str(&prefix, "%Y%m%d%H%M%S") {
        Ok(date_time) => (date_time.month(), date_time.year()),
        Err(_) => {
            tracing::warn!(date = %date_str, "malformed creation date, falling back to (1, 1)");
            (1, 1)
        }
    }
}

/// Scan the document subject for a `doi` substring and strip spaces.
pub fn extract_doi(subject: &str) -> String {
    match subject.find("doi") {
        Some(idx) => subject[idx..].replace(' ', ""),
        None => MISSING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn metadata(author: &str, subject: &str, creation_date: &str) -> PaperMetadata {
        let opt = |s: &str| {
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };
        PaperMetadata {
            author: opt(author),
            subject: opt(subject),
            creation_date: opt(creation_date),
        }
    }

    #[test]
    fn test_extract_month_year() {
        assert_eq!(extract_month_year("D:20210312094500"), (3, 2021));
        assert_eq!(extract_month_year("20191101000000+01'00'"), (11, 2019));
    }

    #[test]
    fn test_extract_month_year_malformed_degrades() {
        assert_eq!(extract_month_year("D:garbage"), (1, 1));
        assert_eq!(extract_month_year("D:2021"), (1, 1));
    }

    #[test]
    fn test_extract_doi() {
        assert_eq!(
            extract_doi("see doi: 10.1000/xyz 123"),
            "doi:10.1000/xyz123"
        );
        assert_eq!(extract_doi("no identifier here"), MISSING);
    }

    #[test]
    fn test_extraction_fills_record_and_leaves_ledger_empty() {
        let mut ledger = PaperLedger::new();
        let record = resolve_record(
            &metadata("Doe", "doi:10.1/x", "D:20200102030405"),
            &PaperOverride::default(),
            &mut ledger,
            Notes::new(),
        );
        assert_eq!(record.author, "Doe");
        assert_eq!(record.date, PaperDate::MonthYear(1, 2020));
        assert_eq!(record.doi, "doi:10.1/x");
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_empty_metadata_marks_all_fields_missing() {
        let mut ledger = PaperLedger::new();
        let record = resolve_record(
            &metadata("", "", ""),
            &PaperOverride::default(),
            &mut ledger,
            Notes::new(),
        );
        assert_eq!(record.author, MISSING);
        assert!(record.date.is_missing());
        assert_eq!(record.doi, MISSING);
        assert_eq!(ledger.get("author"), Some(&json!(MISSING)));
        assert_eq!(ledger.get("date"), Some(&json!(MISSING)));
        assert_eq!(ledger.get("doi"), Some(&json!(MISSING)));
    }

    #[test]
    fn test_subject_without_doi_marks_doi_missing() {
        let mut ledger = PaperLedger::new();
        let record = resolve_record(
            &metadata("Doe", "just a subject line", "D:20200102030405"),
            &PaperOverride::default(),
            &mut ledger,
            Notes::new(),
        );
        assert_eq!(record.doi, MISSING);
        assert_eq!(ledger.get("doi"), Some(&json!(MISSING)));
    }

    #[test]
    fn test_override_wins_over_extraction() {
        let mut ledger = PaperLedger::new();
        let overrides = PaperOverride {
            author: Some("Corrected Author".to_string()),
            date: Some(PaperDate::MonthYear(6, 1999)),
            ..Default::default()
        };
        let record = resolve_record(
            &metadata("Wrong Author", "", "D:20200102030405"),
            &overrides,
            &mut ledger,
            Notes::new(),
        );
        assert_eq!(record.author, "Corrected Author");
        assert_eq!(record.date, PaperDate::MonthYear(6, 1999));
        // override does not touch the ledger
        assert_eq!(ledger.get("author"), None);
    }

    #[test]
    fn test_ledger_backfill_is_adopted_and_consumed() {
        let mut ledger = PaperLedger::from_iter([
            ("author".to_string(), json!("Backfilled Author")),
            ("date".to_string(), json!([4, 2018])),
        ]);
        let record = resolve_record(
            &metadata("", "", ""),
            &PaperOverride::default(),
            &mut ledger,
            Notes::new(),
        );
        assert_eq!(record.author, "Backfilled Author");
        assert_eq!(record.date, PaperDate::MonthYear(4, 2018));
        assert_eq!(ledger.get("author"), None);
        assert_eq!(ledger.get("date"), None);
        // doi was never recorded and is still unresolvable
        assert_eq!(ledger.get("doi"), Some(&json!(MISSING)));
    }

    #[test]
    fn test_missing_sentinel_in_ledger_stays_put() {
        let mut ledger =
            PaperLedger::from_iter([("author".to_string(), json!(MISSING))]);
        let record = resolve_record(
            // metadata would have an author, but the recorded sentinel wins
            &metadata("From Pdf", "", "D:20200102030405"),
            &PaperOverride::default(),
            &mut ledger,
            Notes::new(),
        );
        assert_eq!(record.author, MISSING);
        assert_eq!(ledger.get("author"), Some(&json!(MISSING)));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut ledger = PaperLedger::new();
        let meta = metadata("", "doi:10.5/abc", "");
        let first = resolve_record(&meta, &PaperOverride::default(), &mut ledger, Notes::new());
        let second = resolve_record(&meta, &PaperOverride::default(), &mut ledger, Notes::new());
        assert_eq!(first, second);
    }

    #[test]
    fn test_conflicting_sources_rejected() {
        let overrides = Overrides::from_iter([(
            "some_paper".to_string(),
            PaperOverride {
                author: Some("A".to_string()),
                ..Default::default()
            },
        )]);
        let ledger = Ledger::from_iter([(
            "some_paper".to_string(),
            PaperLedger::from_iter([("author".to_string(), json!(MISSING))]),
        )]);
        assert_eq!(
            validate_sources(&overrides, &ledger),
            Err(MetadataError::ConflictingFieldSource {
                paper: "some_paper".to_string(),
                field: "author".to_string(),
            })
        );
    }

    #[test]
    fn test_disjoint_sources_pass_validation() {
        let overrides = Overrides::from_iter([(
            "some_paper".to_string(),
            PaperOverride {
                doi: Some("doi:10.1/x".to_string()),
                ..Default::default()
            },
        )]);
        let ledger = Ledger::from_iter([(
            "some_paper".to_string(),
            PaperLedger::from_iter([("author".to_string(), json!(MISSING))]),
        )]);
        assert_eq!(validate_sources(&overrides, &ledger), Ok(()));
    }

    #[test]
    fn test_paper_date_json_shapes() {
        assert_eq!(
            serde_json::to_string(&PaperDate::MonthYear(3, 2021)).unwrap(),
            "[3,2021]"
        );
        assert_eq!(
            serde_json::to_string(&PaperDate::missing()).unwrap(),
            "\"missing\""
        );
        let parsed: PaperDate = serde_json::from_str("[12,1999]").unwrap();
        assert_eq!(parsed, PaperDate::MonthYear(12, 1999));
    }
}
