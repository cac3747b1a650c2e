//! Annotation note parsing and aggregation
//!
//! This module turns the flat, page-ordered stream of annotations of one
//! document into the nested note structure of the report: note type →
//! category → entries. Two note types are synthesized by the aggregator and
//! therefore reserved: `general` (untyped notes) and `answered` (questions
//! that received an answer).

pub mod aggregate;
pub mod parse;

pub use aggregate::{NoteAggregator, NoteBucket, NoteEntry, Notes};
pub use parse::{parse_note, NoteRecord};

use thiserror::Error;

/// Note types users must not write themselves; the aggregator owns them.
pub const RESERVED_NOTE_TYPES: [&str; 2] = ["general", "answered"];

/// Errors raised while decoding or pairing annotations of one document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoteError {
    /// The annotation used `general` or `answered` as an explicit note type.
    #[error(
        "note type '{kind}' must not be used (reserved types are {:?}); from note '{body}' in '{document}' on page {page}",
        RESERVED_NOTE_TYPES
    )]
    ReservedNoteType {
        kind: String,
        body: String,
        document: String,
        page: u32,
    },

    /// A reply-style answer whose preceding annotation is not a pending question.
    #[error("answer '{body}' in '{document}' on page {page} is replying to a note that is not specified as a question")]
    UnattachedAnswer {
        body: String,
        document: String,
        page: u32,
    },

    /// An index-style answer without a numeric category token.
    #[error(
        "answer '{body}' in '{document}' on page {page} is not connected to a question but it \
         must be; the note specifier should end in '_idx'"
    )]
    UnindexedAnswer {
        body: String,
        document: String,
        page: u32,
    },

    /// The annotation subject is not in the subject translation table.
    #[error("unknown annotation subject '{subject}' in '{document}' on page {page}; extend the subject table for this reader locale")]
    UnknownSubject {
        subject: String,
        document: String,
        page: u32,
    },
}
