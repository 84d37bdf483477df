//! Result partitioning for folder view
//!
//! On the result-ready boundary a folder-view payload is split into:
//! - the child folders to display at the current level, read from the
//!   hierarchical folder facet;
//! - the results stored directly at the current level, in engine order.
//!
//! The facet walk is bounded by the folder level. Engines sometimes return a
//! tree whose intermediate nodes are not marked selected yet, so each depth
//! prefers the selected sibling, then the sibling named by the captured path,
//! then the first sibling. When no selected node turns up within the bound the
//! listing is empty rather than guessed.

use serde::{Deserialize, Serialize};

use crate::config::clean_field;
use crate::error::{FolderViewError, FolderViewResult};
use crate::results::{FacetEntry, FacetValueNode, ResultItem, ResultPayload};
use crate::tracker::{FolderLevel, FolderPath};

/// A child folder to render as a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderTile {
    /// Folder name
    pub value: String,
    /// Full path of the folder, root first; selecting it navigates inside
    pub path: FolderPath,
    /// Number of matching results, when the engine reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_results: Option<u64>,
}

impl FolderTile {
    fn from_node(node: &FacetValueNode, parent: &FolderPath) -> Self {
        Self {
            value: node.value.clone(),
            path: parent.child(node.value.clone()),
            number_of_results: node.number_of_results,
        }
    }
}

/// Child folders of the current level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderListing {
    /// Level the listing was computed for
    pub level: FolderLevel,
    /// Tiles, in facet order
    pub tiles: Vec<FolderTile>,
}

impl FolderListing {
    /// Whether this is a non-root folder with no subfolders.
    #[must_use]
    pub fn is_empty_folder(&self) -> bool {
        self.tiles.is_empty() && !self.level.is_root()
    }
}

/// Outcome of partitioning one payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    /// Child folders
    pub listing: FolderListing,
    /// Results stored at the current level
    pub results: Vec<ResultItem>,
}

/// Split a payload into child folders and same-level results.
///
/// # Errors
/// Returns [`FolderViewError::FacetNotFound`] when the payload has no facet
/// section for `facet_field`.
pub fn partition(
    payload: &ResultPayload,
    facet_field: &str,
    item_level_field: &str,
    level: FolderLevel,
    path: &FolderPath,
) -> FolderViewResult<Partition> {
    let facet = payload
        .facet(facet_field)
        .ok_or_else(|| FolderViewError::FacetNotFound {
            field: clean_field(facet_field).to_string(),
        })?;

    Ok(Partition {
        listing: child_folders(facet, level, path),
        results: filter_by_level(&payload.results, item_level_field, level),
    })
}

/// Child folders to show at `level`.
#[must_use]
pub fn child_folders(facet: &FacetEntry, level: FolderLevel, path: &FolderPath) -> FolderListing {
    let tiles = match descend(&facet.values, level, path) {
        Some((children, parent)) => children
            .iter()
            .map(|node| FolderTile::from_node(node, &parent))
            .collect(),
        None => {
            tracing::warn!(
                field = %facet.field,
                level = level.get(),
                path = %path.join('/'),
                "no selected folder found in facet tree; showing empty listing"
            );
            Vec::new()
        }
    };
    FolderListing { level, tiles }
}

/// Results whose item level equals `level`, order preserved.
#[must_use]
pub fn filter_by_level(
    results: &[ResultItem],
    item_level_field: &str,
    level: FolderLevel,
) -> Vec<ResultItem> {
    results
        .iter()
        .filter(|item| item.item_level(item_level_field) == Some(level))
        .cloned()
        .collect()
}

/// Walk at most `level - 1` depths looking for the selected folder.
///
/// Returns the selected node's children and that node's path.
fn descend<'a>(
    values: &'a [FacetValueNode],
    level: FolderLevel,
    path: &FolderPath,
) -> Option<(&'a [FacetValueNode], FolderPath)> {
    if level.is_root() {
        return Some((values, FolderPath::root()));
    }

    let mut siblings = values;
    let mut walked = FolderPath::root();
    for depth in 0..level.get() - 1 {
        let node = pick_sibling(siblings, path.segment(depth as usize))?;
        walked = walked.child(node.value.clone());
        if node.is_selected() {
            return Some((&node.children, walked));
        }
        siblings = &node.children;
    }
    None
}

fn pick_sibling<'a>(
    siblings: &'a [FacetValueNode],
    segment: Option<&str>,
) -> Option<&'a FacetValueNode> {
    siblings
        .iter()
        .find(|node| node.is_selected())
        .or_else(|| segment.and_then(|s| siblings.iter().find(|node| node.value == s)))
        .or_else(|| siblings.first())
}
