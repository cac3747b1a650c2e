//! The collection tree
//!
//! A walked literature tree mirrors the directory structure: directory nodes
//! own their children by display name, paper nodes hold the resolved
//! [`PaperRecord`]. The tree serializes untagged, so the JSON dump reads like
//! the directory layout itself.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::metadata::PaperRecord;

/// One node of the collection tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CollectionNode {
    Paper(PaperRecord),
    Directory(IndexMap<String, CollectionNode>),
}

impl CollectionNode {
    pub fn as_paper(&self) -> Option<&PaperRecord> {
        match self {
            CollectionNode::Paper(record) => Some(record),
            CollectionNode::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&IndexMap<String, CollectionNode>> {
        match self {
            CollectionNode::Directory(children) => Some(children),
            CollectionNode::Paper(_) => None,
        }
    }
}

/// Parallel report of papers pruned for having no notes: paper-only
/// directories map to the pruned display names, nested directories recurse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmptyReport {
    Papers(Vec<String>),
    Directories(IndexMap<String, EmptyReport>),
}

/// Remove papers without notes from the tree and report them.
///
/// A paper-only directory whose papers were all pruned is removed as well.
/// A directory with subdirectories keeps its direct papers untouched and
/// recurses.
pub fn prune_empty(tree: &mut IndexMap<String, CollectionNode>) -> IndexMap<String, EmptyReport> {
    let mut report = IndexMap::new();
    let mut emptied = Vec::new();

    for (name, node) in tree.iter_mut() {
        let CollectionNode::Directory(children) = node else {
            continue;
        };

        let has_subdirectories = children
            .values()
            .any(|child| matches!(child, CollectionNode::Directory(_)));

        if has_subdirectories {
            report.insert(
                name.clone(),
                EmptyReport::Directories(prune_empty(children)),
            );
        } else {
            let mut pruned = Vec::new();
            children.retain(|paper, child| match child {
                CollectionNode::Paper(record) if record.notes.is_empty() => {
                    pruned.push(paper.clone());
                    false
                }
                _ => true,
            });
            if children.is_empty() {
                emptied.push(name.clone());
            }
            report.insert(name.clone(), EmptyReport::Papers(pruned));
        }
    }

    for name in emptied {
        tree.shift_remove(&name);
    }
    report
}
