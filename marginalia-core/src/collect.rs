//! The collection run
//!
//! Ties the pieces together: load the overwrite file and the missing ledger,
//! validate that no field is fed from both, walk the literature tree, then
//! persist the updated ledger and the optional JSON outputs.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::collection::{prune_empty, CollectionNode, EmptyReport};
use crate::metadata::{validate_sources, Ledger, Overrides};
use crate::paper::OpenPaper;
use crate::subjects::SubjectTable;
use crate::walk::Walker;

/// Options of one collection run. All file options resolve relative to the
/// root directory unless absolute.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Name of the literature subdirectory under the root.
    pub literature_dir: String,
    /// Optional overwrite file (file stem → field → value).
    pub overwrite_file: Option<PathBuf>,
    /// The missing-fields ledger; read if present, always written back.
    pub missing_file: PathBuf,
    /// Optional JSON dump of the (pruned) collection tree.
    pub collection_file: Option<PathBuf>,
    /// Empty-notes report; `None` skips pruning altogether.
    pub empty_file: Option<PathBuf>,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            literature_dir: "literature".to_string(),
            overwrite_file: None,
            missing_file: PathBuf::from("missing.json"),
            collection_file: None,
            empty_file: Some(PathBuf::from("empty.json")),
        }
    }
}

/// Result of a collection run.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedNotes {
    /// The collection tree, already pruned when an empty report was requested.
    pub collection: IndexMap<String, CollectionNode>,
    /// The empty-notes report, when pruning ran.
    pub empty: Option<IndexMap<String, EmptyReport>>,
}

/// Run a full collection pass over `root`.
pub fn collect_notes<O: OpenPaper>(
    root: &Path,
    opener: &O,
    subjects: &SubjectTable,
    options: &CollectOptions,
) -> crate::Result<CollectedNotes> {
    let literature = root.join(&options.literature_dir);
    let missing_file = resolve(root, &options.missing_file);

    let mut ledger: Ledger = if missing_file.is_file() {
        serde_json::from_reader(BufReader::new(File::open(&missing_file)?))?
    } else {
        Ledger::new()
    };

    let overrides: Overrides = match &options.overwrite_file {
        Some(file) => serde_json::from_reader(BufReader::new(File::open(resolve(root, file))?))?,
        None => Overrides::new(),
    };

    validate_sources(&overrides, &ledger)?;

    let mut collection =
        Walker::new(opener, subjects).collect(&literature, &overrides, &mut ledger)?;

    write_json(&missing_file, &ledger)?;

    let empty = match &options.empty_file {
        Some(file) => {
            let report = prune_empty(&mut collection);
            write_json(&resolve(root, file), &report)?;
            Some(report)
        }
        None => None,
    };

    if let Some(file) = &options.collection_file {
        write_json(&resolve(root, file), &collection)?;
    }

    Ok(CollectedNotes { collection, empty })
}

fn resolve(root: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        root.join(file)
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> crate::Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    tracing::info!(file = %path.display(), "wrote output file");
    Ok(())
}
