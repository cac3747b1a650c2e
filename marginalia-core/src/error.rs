use thiserror::Error;

use crate::latex::RenderError;
use crate::metadata::MetadataError;
use crate::notes::NoteError;
use crate::walk::WalkError;

/// Crate-wide error type.
///
/// Every fatal condition of a collection or rendering run ends up here; the
/// run aborts with the first error, there is no recovery path.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] oxidize_pdf::parser::ParseError),

    #[error(transparent)]
    Note(#[from] NoteError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_io_error_conversion() {
        let io_error = IoError::new(ErrorKind::NotFound, "file not found");
        let error = Error::from(io_error);

        match error {
            Error::Io(ref err) => assert_eq!(err.kind(), ErrorKind::NotFound),
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_note_error_display_is_transparent() {
        let error = Error::from(NoteError::UnknownSubject {
            subject: "Unbekannt".to_string(),
            document: "paper.pdf".to_string(),
            page: 3,
        });
        let msg = error.to_string();
        assert!(msg.contains("Unbekannt"));
        assert!(msg.contains("paper.pdf"));
        assert!(msg.contains("page 3"));
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
