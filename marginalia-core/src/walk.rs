//! Literature tree walking
//!
//! Descends the literature directory, turns every `.pdf` into a paper node
//! and every subdirectory into a directory node. Entries are visited in
//! lexicographic order so runs are deterministic across platforms.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;

use crate::collection::CollectionNode;
use crate::metadata::{Ledger, Overrides};
use crate::paper::{extract_paper, OpenPaper};
use crate::subjects::SubjectTable;

/// Errors of the directory walk.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalkError {
    /// A non-PDF file (other than platform artifacts) in the literature tree.
    #[error("found file '{file}' in directory '{directory}'; there must only be .pdf files here")]
    UnexpectedFile { file: String, directory: PathBuf },
}

/// File-system names become display names: underscores turn into spaces.
pub fn display_name(name: &str) -> String {
    name.replace('_', " ")
}

/// Walks a literature tree and builds the collection.
pub struct Walker<'a, O: OpenPaper> {
    opener: &'a O,
    subjects: &'a SubjectTable,
}

impl<'a, O: OpenPaper> Walker<'a, O> {
    pub fn new(opener: &'a O, subjects: &'a SubjectTable) -> Self {
        Self { opener, subjects }
    }

    /// Walk `literature` and return its children as the collection tree.
    /// Ledger slices are consumed per paper and written back when fields are
    /// still unresolved.
    pub fn collect(
        &self,
        literature: &Path,
        overrides: &Overrides,
        ledger: &mut Ledger,
    ) -> crate::Result<IndexMap<String, CollectionNode>> {
        self.walk_dir(literature, overrides, ledger)
    }

    fn walk_dir(
        &self,
        dir: &Path,
        overrides: &Overrides,
        ledger: &mut Ledger,
    ) -> crate::Result<IndexMap<String, CollectionNode>> {
        let mut entries = std::fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut children = IndexMap::new();
        for entry in entries {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            if path.is_dir() {
                let subtree = self.walk_dir(&path, overrides, ledger)?;
                children.insert(display_name(&name), CollectionNode::Directory(subtree));
                continue;
            }

            let Some(stem) = name.strip_suffix(".pdf") else {
                if name == ".DS_Store" {
                    continue;
                }
                return Err(WalkError::UnexpectedFile {
                    file: name,
                    directory: dir.to_path_buf(),
                }
                .into());
            };

            let paper_override = overrides.get(stem).cloned().unwrap_or_default();
            let mut slice = ledger.shift_remove(stem).unwrap_or_default();
            let paper_name = paper_override
                .name
                .clone()
                .unwrap_or_else(|| display_name(stem));

            tracing::info!(paper = %paper_name, path = %path.display(), "collecting paper");
            let source = self.opener.open(&path)?;
            let record =
                extract_paper(&source, &name, self.subjects, &paper_override, &mut slice)?;

            if !slice.is_empty() {
                ledger.insert(stem.to_string(), slice);
            }
            children.insert(paper_name, CollectionNode::Paper(record));
        }

        Ok(children)
    }
}
