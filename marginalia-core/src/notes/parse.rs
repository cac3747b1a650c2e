//! Decoding of a single annotation's content string
//!
//! The grammar is a plain text convention: `<type>[_<category>...]: <body>`.
//! Content without a colon is an untyped, uncategorized note.

use super::{NoteError, RESERVED_NOTE_TYPES};

/// One decoded annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    /// Note type token, `general` when the content carries no colon prefix.
    pub kind: String,
    /// Underscore-separated category path; `None` for colonless content,
    /// `["general"]` when a typed note names no category.
    pub category: Option<Vec<String>>,
    /// Note body with leading spaces stripped.
    pub body: String,
}

impl NoteRecord {
    /// First category token, if the note is categorized at all.
    pub fn first_category(&self) -> Option<&str> {
        self.category
            .as_ref()
            .and_then(|cats| cats.first())
            .map(String::as_str)
    }

    /// Category path joined with `_`, the key used for index-style pairing.
    pub fn category_key(&self) -> Option<String> {
        self.category.as_ref().map(|cats| cats.join("_"))
    }

    /// Whether any category token is numeric (an explicit pairing index).
    pub fn has_index(&self) -> bool {
        self.category
            .as_ref()
            .map(|cats| {
                cats.iter()
                    .any(|cat| !cat.is_empty() && cat.chars().all(|c| c.is_ascii_digit()))
            })
            .unwrap_or(false)
    }
}

/// Parse one annotation content string.
///
/// `document` and `page` only feed the error message; the grammar itself is
/// position-independent.
pub fn parse_note(content: &str, document: &str, page: u32) -> Result<NoteRecord, NoteError> {
    let Some((head, rest)) = content.split_once(':') else {
        return Ok(NoteRecord {
            kind: "general".to_string(),
            category: None,
            body: content.to_string(),
        });
    };

    let mut tokens = head.split('_');
    // split always yields at least one element
    let kind = tokens.next().unwrap_or_default().to_string();
    if RESERVED_NOTE_TYPES.contains(&kind.as_str()) {
        return Err(NoteError::ReservedNoteType {
            kind,
            body: rest.to_string(),
            document: document.to_string(),
            page,
        });
    }

    let category: Vec<String> = tokens.map(str::to_string).collect();
    let category = if category.is_empty() {
        vec!["general".to_string()]
    } else {
        category
    };

    Ok(NoteRecord {
        kind,
        category: Some(category),
        body: rest.trim_start_matches(' ').to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colonless_content_is_general_and_uncategorized() {
        let record = parse_note("just a remark", "a.pdf", 1).unwrap();
        assert_eq!(record.kind, "general");
        assert_eq!(record.category, None);
        assert_eq!(record.body, "just a remark");
    }

    #[test]
    fn test_typed_note_without_category_gets_general_category() {
        let record = parse_note("question: why?", "a.pdf", 1).unwrap();
        assert_eq!(record.kind, "question");
        assert_eq!(record.category, Some(vec!["general".to_string()]));
        assert_eq!(record.body, "why?");
    }

    #[test]
    fn test_underscore_tokens_become_category_path() {
        let record = parse_note("question_method_3: how is X measured?", "a.pdf", 2).unwrap();
        assert_eq!(record.kind, "question");
        assert_eq!(
            record.category,
            Some(vec!["method".to_string(), "3".to_string()])
        );
        assert_eq!(record.body, "how is X measured?");
        assert!(record.has_index());
        assert_eq!(record.category_key(), Some("method_3".to_string()));
    }

    #[test]
    fn test_inner_colons_stay_in_body() {
        let record = parse_note("remark: see 3:1 ratio", "a.pdf", 1).unwrap();
        assert_eq!(record.body, "see 3:1 ratio");
    }

    #[test]
    fn test_leading_spaces_stripped_from_body() {
        let record = parse_note("remark:    spaced out", "a.pdf", 1).unwrap();
        assert_eq!(record.body, "spaced out");
    }

    #[test]
    fn test_reserved_general_prefix_is_rejected() {
        let err = parse_note("general_foo: text", "paper.pdf", 4).unwrap_err();
        assert_eq!(
            err,
            NoteError::ReservedNoteType {
                kind: "general".to_string(),
                body: " text".to_string(),
                document: "paper.pdf".to_string(),
                page: 4,
            }
        );
    }

    #[test]
    fn test_reserved_answered_prefix_is_rejected() {
        let err = parse_note("answered: text", "paper.pdf", 1).unwrap_err();
        assert!(matches!(err, NoteError::ReservedNoteType { kind, .. } if kind == "answered"));
    }

    #[test]
    fn test_non_numeric_categories_have_no_index() {
        let record = parse_note("question_method: why?", "a.pdf", 1).unwrap();
        assert!(!record.has_index());
    }

    #[test]
    fn test_first_category() {
        let record = parse_note("note_setup_2: detail", "a.pdf", 1).unwrap();
        assert_eq!(record.first_category(), Some("setup"));
        let record = parse_note("plain text", "a.pdf", 1).unwrap();
        assert_eq!(record.first_category(), None);
    }
}
