//! # marginalia
//!
//! Collects the annotations a reader leaves in a tree of PDF papers and turns
//! them into a hierarchical LaTeX report.
//!
//! Annotations follow a small text convention: the part of the comment before
//! the first `:` names a note type and an optional underscore-separated
//! category path (`question_method_3: how is X measured?`), the rest is the
//! note body. Questions and answers are paired either through the reader's
//! native reply threads or through a shared numeric category index; everything
//! else is kept as a standalone note. Document metadata (author, creation
//! date, DOI) is merged with a user-maintained overwrite file and a persisted
//! "missing fields" ledger, so gaps only have to be filled in once.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use marginalia::collect::{collect_notes, CollectOptions};
//! use marginalia::latex::render_report;
//! use marginalia::paper::OpenPdf;
//! use marginalia::subjects::SubjectTable;
//! use std::path::Path;
//!
//! # fn main() -> marginalia::Result<()> {
//! let subjects = SubjectTable::default();
//! let options = CollectOptions::default();
//! let collected = collect_notes(Path::new("."), &OpenPdf, &subjects, &options)?;
//! let report = render_report(&collected.collection)?;
//! std::fs::write("collected.tex", report)?;
//! # Ok(())
//! # }
//! ```
//!
//! PDF access goes through [`paper::PaperSource`], so the collection pipeline
//! can be driven without real PDFs in tests. The shipped implementation,
//! [`paper::PdfPaper`], reads annotations and the info dictionary through the
//! `oxidize-pdf` parser.

pub mod collect;
pub mod collection;
pub mod error;
pub mod latex;
pub mod metadata;
pub mod notes;
pub mod paper;
pub mod subjects;
pub mod walk;

pub use collect::{collect_notes, CollectOptions, CollectedNotes};
pub use collection::{prune_empty, CollectionNode, EmptyReport};
pub use error::{Error, Result};
pub use latex::{render_report, RenderError};
pub use metadata::{MetadataError, PaperDate, PaperRecord, MISSING};
pub use notes::{NoteBucket, NoteEntry, NoteError, Notes};
pub use paper::{OpenPaper, OpenPdf, PageAnnotations, PaperSource, PdfPaper, RawAnnotation};
pub use subjects::{SubjectKind, SubjectTable};
pub use walk::{WalkError, Walker};
