//! Folder level and path tracking
//!
//! The active folder is whatever the folder facet currently selects:
//! [`FolderPath`] is that selection root-to-current, and [`FolderLevel`] is the
//! depth whose items are shown (`1` at the root, before any selection).

use serde::{Deserialize, Serialize};

use crate::state::QueryStateSnapshot;

/// 1-based depth in the folder hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderLevel(u32);

impl FolderLevel {
    /// The root level (no folder selected).
    pub const ROOT: Self = Self(1);

    /// Create a level, returning `None` for zero.
    #[must_use]
    pub const fn new(level: u32) -> Option<Self> {
        if level == 0 { None } else { Some(Self(level)) }
    }

    /// Level shown when `path` is selected.
    #[must_use]
    pub fn for_path(path: &FolderPath) -> Self {
        let depth = u32::try_from(path.len()).unwrap_or(u32::MAX - 1);
        Self(depth.saturating_add(1))
    }

    /// Raw 1-based value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Whether this is the root level.
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.0 == 1
    }
}

impl Default for FolderLevel {
    fn default() -> Self {
        Self::ROOT
    }
}

impl std::fmt::Display for FolderLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Root-to-current sequence of selected folder values.
///
/// Segments must not contain the configured delimiter; joining and parsing
/// are only inverse operations under that constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderPath(Vec<String>);

impl FolderPath {
    /// The empty (root) path.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a delimiter-joined path. An empty string is the root path.
    #[must_use]
    pub fn parse(joined: &str, delimiter: char) -> Self {
        if joined.is_empty() {
            return Self::root();
        }
        Self(joined.split(delimiter).map(str::to_string).collect())
    }

    /// Join the segments with `delimiter`.
    #[must_use]
    pub fn join(&self, delimiter: char) -> String {
        self.0.join(&delimiter.to_string())
    }

    /// Path extended by one child segment.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Segments, root first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Segment at a 0-based depth.
    #[must_use]
    pub fn segment(&self, depth: usize) -> Option<&str> {
        self.0.get(depth).map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FolderPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Current folder level and path derived from the folder facet selection.
#[must_use]
pub fn compute_level_and_path(
    state: &QueryStateSnapshot,
    facet_field: &str,
) -> (FolderLevel, FolderPath) {
    let path: FolderPath = state.facet_values(facet_field).iter().cloned().collect();
    (FolderLevel::for_path(&path), path)
}
