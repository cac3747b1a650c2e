//! Annotation subject normalization
//!
//! The `/Subj` entry of an annotation is written by the PDF reader in its UI
//! language ("Notiz" vs "Sticky Note"), so the raw value cannot be compared
//! across documents. A [`SubjectTable`] maps the locale-dependent strings to
//! the two kinds the aggregator cares about: ordinary page-anchored comments
//! and the popup replies a reader attaches to them.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Normalized annotation subject kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    /// A comment anchored to page content (text comment, sticky highlight).
    Note,
    /// A reply inside an existing annotation's popup thread.
    Reply,
}

lazy_static! {
    static ref BUILTIN_SUBJECTS: IndexMap<String, SubjectKind> = {
        let mut map = IndexMap::new();
        map.insert("Kommentar zu Text".to_string(), SubjectKind::Note);
        map.insert("Comment on Text".to_string(), SubjectKind::Note);
        map.insert("Notiz".to_string(), SubjectKind::Reply);
        map.insert("Sticky Note".to_string(), SubjectKind::Reply);
        map.insert("Hervorheben".to_string(), SubjectKind::Note);
        map.insert("Highlight".to_string(), SubjectKind::Note);
        map
    };
}

/// Translation table from raw `/Subj` strings to [`SubjectKind`].
///
/// Starts out with the built-in German/English entries and can be extended
/// with user-supplied mappings for other reader locales. The table is plain
/// data and is passed into the walker explicitly; nothing in the crate keeps
/// global subject state.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectTable {
    map: IndexMap<String, SubjectKind>,
}

impl Default for SubjectTable {
    fn default() -> Self {
        Self {
            map: BUILTIN_SUBJECTS.clone(),
        }
    }
}

impl SubjectTable {
    /// Create an empty table without the built-in entries.
    pub fn empty() -> Self {
        Self {
            map: IndexMap::new(),
        }
    }

    /// Look up the normalized kind for a raw subject string.
    pub fn get(&self, subject: &str) -> Option<SubjectKind> {
        self.map.get(subject).copied()
    }

    /// Add or override entries. Later entries win over built-in ones, so a
    /// user file can both extend the table and correct a mapping.
    pub fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, SubjectKind)>,
    {
        for (subject, kind) in entries {
            self.map.insert(subject, kind);
        }
    }

    /// Number of known subject strings.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
