//! Paper access seam
//!
//! [`PaperSource`] is the boundary between the collection pipeline and PDF
//! I/O: a source yields the info-dictionary metadata and the page-ordered
//! annotation stream of one document. [`PdfPaper`] is the real implementation
//! on top of the `oxidize-pdf` parser; [`StubPaper`] serves tests that drive
//! the walker without PDF files.

use std::fs::File;
use std::path::Path;

use oxidize_pdf::parser::{PdfDictionary, PdfDocument, PdfReader, PdfString};

use crate::metadata::{resolve_record, PaperLedger, PaperMetadata, PaperOverride, PaperRecord};
use crate::notes::NoteAggregator;
use crate::subjects::SubjectTable;

/// One annotation as read from a page, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAnnotation {
    /// `/Contents` text, empty for bare highlights.
    pub content: String,
    /// Raw locale-dependent `/Subj` string.
    pub subject: String,
}

/// The annotations of one page, in `/Annots` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAnnotations {
    /// 1-based page number.
    pub page: u32,
    pub annotations: Vec<RawAnnotation>,
}

/// Read access to one paper.
pub trait PaperSource {
    /// Document-level metadata from the info dictionary.
    fn metadata(&self) -> crate::Result<PaperMetadata>;

    /// All annotations, page-major in document order.
    fn annotations(&self) -> crate::Result<Vec<PageAnnotations>>;
}

/// Opens a [`PaperSource`] for a path; injected into the walker so tests can
/// substitute stub papers.
pub trait OpenPaper {
    type Paper: PaperSource;

    fn open(&self, path: &Path) -> crate::Result<Self::Paper>;
}

/// The default opener: real PDFs through `oxidize-pdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenPdf;

impl OpenPaper for OpenPdf {
    type Paper = PdfPaper;

    fn open(&self, path: &Path) -> crate::Result<PdfPaper> {
        PdfPaper::open(path)
    }
}

/// A parsed PDF document.
pub struct PdfPaper {
    document: PdfDocument<File>,
}

impl PdfPaper {
    pub fn open(path: &Path) -> crate::Result<Self> {
        let reader = PdfReader::open(path)?;
        Ok(Self {
            document: PdfDocument::new(reader),
        })
    }
}

impl PaperSource for PdfPaper {
    fn metadata(&self) -> crate::Result<PaperMetadata> {
        let metadata = self.document.metadata()?;
        Ok(PaperMetadata {
            author: metadata.author,
            subject: metadata.subject,
            creation_date: metadata.creation_date,
        })
    }

    fn annotations(&self) -> crate::Result<Vec<PageAnnotations>> {
        let page_count = self.document.page_count()?;
        let mut pages = Vec::with_capacity(page_count as usize);

        for index in 0..page_count {
            let page = self.document.get_page(index)?;
            let mut annotations = Vec::new();

            if let Some(array) = page.get_annotations() {
                for object in &array.0 {
                    let resolved = self.document.resolve(object)?;
                    let Some(dict) = resolved.as_dict() else {
                        continue;
                    };
                    // only reader comments carry /Subj; links, widgets and
                    // popups are skipped here
                    let Some(subject) = self.string_entry(dict, "Subj")? else {
                        continue;
                    };
                    let content = self.string_entry(dict, "Contents")?.unwrap_or_default();
                    annotations.push(RawAnnotation { content, subject });
                }
            }

            pages.push(PageAnnotations {
                page: index + 1,
                annotations,
            });
        }

        Ok(pages)
    }
}

impl PdfPaper {
    fn string_entry(&self, dict: &PdfDictionary, key: &str) -> crate::Result<Option<String>> {
        let Some(object) = dict.get(key) else {
            return Ok(None);
        };
        let resolved = self.document.resolve(object)?;
        Ok(resolved.as_string().map(decode_text_string))
    }
}

/// Decode a PDF text string: UTF-16BE when BOM-prefixed, otherwise treated
/// as (lossy) UTF-8.
fn decode_text_string(string: &PdfString) -> String {
    let bytes = string.as_bytes();
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&utf16)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Extract one paper: aggregate its notes and resolve its metadata against
/// the overrides and its ledger slice.
pub fn extract_paper<S: PaperSource>(
    source: &S,
    document: &str,
    subjects: &SubjectTable,
    overrides: &PaperOverride,
    ledger: &mut PaperLedger,
) -> crate::Result<PaperRecord> {
    let metadata = source.metadata()?;
    let pages = source.annotations()?;
    let notes = NoteAggregator::new(subjects, document).aggregate(&pages)?;
    Ok(resolve_record(&metadata, overrides, ledger, notes))
}

/// In-memory paper for tests.
#[derive(Debug, Clone, Default)]
pub struct StubPaper {
    pub metadata: PaperMetadata,
    pub pages: Vec<PageAnnotations>,
}

impl PaperSource for StubPaper {
    fn metadata(&self) -> crate::Result<PaperMetadata> {
        Ok(self.metadata.clone())
    }

    fn annotations(&self) -> crate::Result<Vec<PageAnnotations>> {
        Ok(self.pages.clone())
    }
}
