//! Question/answer aggregation over one document's annotation stream
//!
//! Annotations are processed in document order (page-major, `/Annots` order
//! within a page). Questions pair with answers in two ways:
//!
//! - **reply-style**: the reader's native reply popup directly follows the
//!   question annotation; the reply carries a different subject kind than the
//!   annotation it replies to.
//! - **index-style**: question and answer share a numeric category token
//!   (`question_3: ...` / `answer_3: ...`) and may be pages apart; they are
//!   matched in a final reconciliation pass.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::parse::parse_note;
use super::NoteError;
use crate::paper::PageAnnotations;
use crate::subjects::{SubjectKind, SubjectTable};

/// One line of a note table.
///
/// Serialized untagged, so JSON keeps the compact tuple form:
/// `[page, text]` or `[q_page, q_text, a_page, a_text]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteEntry {
    /// A question together with the answer that resolved it.
    Answered(u32, String, u32, String),
    /// A standalone note or an unanswered question.
    Note(u32, String),
}

/// Entries of one note type, either flat (the uncategorized `general`
/// bucket) or grouped by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteBucket {
    Categories(IndexMap<String, Vec<NoteEntry>>),
    Entries(Vec<NoteEntry>),
}

/// Aggregated notes of one document: note type → bucket.
pub type Notes = IndexMap<String, NoteBucket>;

struct PendingQuestion {
    category: String,
    body: String,
    page: u32,
}

/// Assembles the [`Notes`] of one document from its annotation stream.
pub struct NoteAggregator<'a> {
    subjects: &'a SubjectTable,
    document: String,
}

impl<'a> NoteAggregator<'a> {
    /// `document` is the display name used in error messages.
    pub fn new(subjects: &'a SubjectTable, document: impl Into<String>) -> Self {
        Self {
            subjects,
            document: document.into(),
        }
    }

    /// Run the aggregation over all pages.
    pub fn aggregate(&self, pages: &[PageAnnotations]) -> Result<Notes, NoteError> {
        let mut notes = Notes::new();
        // index-style questions/answers keyed by the joined category path
        let mut questions: IndexMap<String, (String, u32)> = IndexMap::new();
        let mut answers: IndexMap<String, (String, u32)> = IndexMap::new();
        let mut last_subject: Option<SubjectKind> = None;
        let mut pending: Option<PendingQuestion> = None;

        for page in pages {
            tracing::debug!(
                document = %self.document,
                page = page.page,
                annotations = page.annotations.len(),
                "aggregating page annotations"
            );
            for annot in &page.annotations {
                let record = parse_note(&annot.content, &self.document, page.page)?;
                let subject =
                    self.subjects
                        .get(&annot.subject)
                        .ok_or_else(|| NoteError::UnknownSubject {
                            subject: annot.subject.clone(),
                            document: self.document.clone(),
                            page: page.page,
                        })?;

                if record.kind != "question" && record.kind != "answer" {
                    add_note(
                        &mut notes,
                        &record.kind,
                        record.first_category(),
                        NoteEntry::Note(page.page, record.body.clone()),
                    );
                } else if record.kind == "answer" {
                    if last_subject != Some(subject) {
                        // reply-style: the popup reply must sit directly below
                        // a question annotation
                        let question = pending.take().ok_or_else(|| NoteError::UnattachedAnswer {
                            body: record.body.clone(),
                            document: self.document.clone(),
                            page: page.page,
                        })?;
                        add_note(
                            &mut notes,
                            "answered",
                            Some(&question.category),
                            NoteEntry::Answered(
                                question.page,
                                question.body,
                                page.page,
                                record.body.clone(),
                            ),
                        );
                    } else {
                        if !record.has_index() {
                            return Err(NoteError::UnindexedAnswer {
                                body: record.body.clone(),
                                document: self.document.clone(),
                                page: page.page,
                            });
                        }
                        let key = record.category_key().unwrap_or_default();
                        answers.insert(key, (record.body.clone(), page.page));
                    }
                }

                // nothing consumed the previous question, it stays unanswered
                if let Some(question) = pending.take() {
                    add_note(
                        &mut notes,
                        "question",
                        Some(&question.category),
                        NoteEntry::Note(question.page, question.body),
                    );
                }

                if record.kind == "question" {
                    if record.has_index() {
                        let key = record.category_key().unwrap_or_default();
                        questions.insert(key, (record.body.clone(), page.page));
                    } else {
                        pending = Some(PendingQuestion {
                            category: record.first_category().unwrap_or("general").to_string(),
                            body: record.body.clone(),
                            page: page.page,
                        });
                    }
                }

                last_subject = Some(subject);
            }
        }

        if let Some(question) = pending.take() {
            add_note(
                &mut notes,
                "question",
                Some(&question.category),
                NoteEntry::Note(question.page, question.body),
            );
        }

        for (key, (body, q_page)) in questions {
            let display = match key.split_once('_') {
                Some((head, _)) => head.to_string(),
                None => "general".to_string(),
            };
            match answers.get(&key) {
                Some((a_body, a_page)) => add_note(
                    &mut notes,
                    "answered",
                    Some(&display),
                    NoteEntry::Answered(q_page, body, *a_page, a_body.clone()),
                ),
                None => add_note(
                    &mut notes,
                    "question",
                    Some(&display),
                    NoteEntry::Note(q_page, body),
                ),
            }
        }

        Ok(notes)
    }
}

fn add_note(notes: &mut Notes, kind: &str, category: Option<&str>, entry: NoteEntry) {
    match category {
        None => {
            let bucket = notes
                .entry(kind.to_string())
                .or_insert_with(|| NoteBucket::Entries(Vec::new()));
            match bucket {
                NoteBucket::Entries(entries) => entries.push(entry),
                NoteBucket::Categories(categories) => categories
                    .entry("general".to_string())
                    .or_default()
                    .push(entry),
            }
        }
        Some(category) => {
            let bucket = notes
                .entry(kind.to_string())
                .or_insert_with(|| NoteBucket::Categories(IndexMap::new()));
            match bucket {
                NoteBucket::Categories(categories) => categories
                    .entry(category.to_string())
                    .or_default()
                    .push(entry),
                NoteBucket::Entries(entries) => entries.push(entry),
            }
        }
    }
}
