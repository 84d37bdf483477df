//! Outgoing query shaping
//!
//! The host builds each query through a [`QueryBuilder`]; [`shape_query`]
//! adjusts it for the active [`NavigationMode`]. Navigators configured with
//! [`QueryStrategy::DedicatedQuery`](crate::config::QueryStrategy) also issue a
//! [`FolderQuery`] scoped to the current folder, carrying a hierarchical
//! [`FacetRequest`] that expands the whole child set in one round trip.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{FolderViewOptions, clean_field};
use crate::tracker::{FolderLevel, FolderPath};

/// Context key telling downstream logic whether the query is a vanilla folder query.
pub const VANILLA_STATE_CONTEXT_KEY: &str = "vanillaState";
/// Facet request identifier used by folder sub-queries.
pub const FOLDER_FACET_REQUEST_ID: &str = "FolderNavigatorFacetRequest";
/// Free-text expression matching every document, used by folder result queries.
pub const MATCH_ALL_QUERY: &str = "@uri";

/// Which view the interface is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    /// Folder tiles for the current level, results narrowed to that level
    FolderView,
    /// Flat ranked result list
    SearchView,
}

impl NavigationMode {
    /// Mode implied by a vanilla classification.
    #[must_use]
    pub const fn from_vanilla(vanilla: bool) -> Self {
        if vanilla {
            Self::FolderView
        } else {
            Self::SearchView
        }
    }

    /// Whether folders are shown.
    #[must_use]
    pub const fn is_folder_view(self) -> bool {
        matches!(self, Self::FolderView)
    }

    /// The other mode.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::FolderView => Self::SearchView,
            Self::SearchView => Self::FolderView,
        }
    }
}

impl std::fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FolderView => write!(f, "folder_view"),
            Self::SearchView => write!(f, "search_view"),
        }
    }
}

/// Host-side query builder the navigator writes into.
///
/// Implementations must treat every call as a replacement: setting the same
/// sort, context key or facet id twice leaves one value behind.
pub trait QueryBuilder {
    /// Replace the sort criterion.
    fn set_sort_criteria(&mut self, criteria: String);

    /// Set a named context value.
    fn add_context_value(&mut self, key: &str, value: Value);

    /// Add or replace a facet request (keyed by `facet_id`).
    fn add_facet_request(&mut self, request: FacetRequest);
}

/// Serializable query request, usable as the host's builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingQuery {
    /// Free-text expression
    #[serde(default)]
    pub q: String,
    /// Advanced (filter) expression
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub aq: String,
    /// Sort criterion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_criteria: Option<String>,
    /// Named context values
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, Value>,
    /// Facet requests
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<FacetRequest>,
}

impl OutgoingQuery {
    /// Create a query with a free-text expression.
    #[must_use]
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Self::default()
        }
    }

    /// Whether the vanilla-state context flag is set to `true`.
    #[must_use]
    pub fn vanilla_state(&self) -> Option<bool> {
        self.context
            .get(VANILLA_STATE_CONTEXT_KEY)
            .and_then(Value::as_bool)
    }
}

impl QueryBuilder for OutgoingQuery {
    fn set_sort_criteria(&mut self, criteria: String) {
        self.sort_criteria = Some(criteria);
    }

    fn add_context_value(&mut self, key: &str, value: Value) {
        self.context.insert(key.to_string(), value);
    }

    fn add_facet_request(&mut self, request: FacetRequest) {
        if let Some(existing) = self
            .facets
            .iter_mut()
            .find(|f| f.facet_id == request.facet_id)
        {
            *existing = request;
        } else {
            self.facets.push(request);
        }
    }
}

/// Sort criterion front-loading shallow items: `@<field> ascending`.
#[must_use]
pub fn item_level_sort(item_level_field: &str) -> String {
    format!("@{} ascending", clean_field(item_level_field))
}

/// Shape an outgoing query for `mode`.
///
/// In folder view the results are sorted by item level so that a client-side
/// level filter cannot lose same-level items to pagination. The vanilla flag is
/// always written. Calling this again with the same inputs changes nothing.
pub fn shape_query<B: QueryBuilder + ?Sized>(
    builder: &mut B,
    mode: NavigationMode,
    level: FolderLevel,
    item_level_field: &str,
) {
    if mode.is_folder_view() {
        builder.set_sort_criteria(item_level_sort(item_level_field));
    }
    builder.add_context_value(
        VANILLA_STATE_CONTEXT_KEY,
        Value::Bool(mode.is_folder_view()),
    );
    tracing::trace!(%mode, %level, "shaped outgoing query");
}

/// Facet type requested by folder sub-queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetType {
    /// Tree of delimited path values
    Hierarchical,
}

/// Ordering of facet values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetSortCriteria {
    /// By value label
    Alphanumeric,
}

/// Facet request block sent with a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetRequest {
    /// Field to facet on (no `@` prefix)
    pub field: String,
    /// Request identifier echoed in the response
    pub facet_id: String,
    /// Facet type
    #[serde(rename = "type")]
    pub facet_type: FacetType,
    /// Path the returned tree starts from
    pub base_path: Vec<String>,
    /// Whether results are restricted to `base_path`
    pub filter_by_base_path: bool,
    /// Value ordering
    pub sort_criteria: FacetSortCriteria,
    /// Values returned per node
    pub number_of_values: u32,
    /// Documents scanned per value
    pub injection_depth: u32,
    /// Keep the current values in place across queries
    pub freeze_current_values: bool,
    /// Values currently selected
    pub current_values: Vec<String>,
    /// Whether more values were requested
    pub is_field_expanded: bool,
    /// Path segment delimiter
    pub delimiting_character: String,
    /// Whether counts honor the other filters
    pub filter_facet_count: bool,
    /// Disable automatic selection of single-child values
    pub prevent_auto_select: bool,
}

impl FacetRequest {
    /// Hierarchical request fetching the complete folder tree, sorted by name.
    #[must_use]
    pub fn folder_tree(options: &FolderViewOptions) -> Self {
        Self {
            field: options.facet_field_name().to_string(),
            facet_id: FOLDER_FACET_REQUEST_ID.to_string(),
            facet_type: FacetType::Hierarchical,
            base_path: Vec::new(),
            filter_by_base_path: false,
            sort_criteria: FacetSortCriteria::Alphanumeric,
            number_of_values: options.folder_query_size,
            injection_depth: options.folder_query_size,
            freeze_current_values: false,
            current_values: Vec::new(),
            is_field_expanded: false,
            delimiting_character: options.delimiter.to_string(),
            filter_facet_count: true,
            prevent_auto_select: false,
        }
    }
}

/// Filter restricting results to the folder at `path`.
///
/// The root folder matches every item that has a folder value at all.
#[must_use]
pub fn folder_path_filter(options: &FolderViewOptions, path: &FolderPath) -> String {
    let field = options.facet_field_name();
    if path.is_empty() {
        format!("@{field}")
    } else {
        let joined = path.join(options.delimiter).replace('"', "\\\"");
        format!("@{field}=\"{joined}\"")
    }
}

/// Filter restricting results to items at `level`.
#[must_use]
pub fn item_level_filter(options: &FolderViewOptions, level: FolderLevel) -> String {
    format!("@{}=={level}", options.item_level_field_name())
}

/// Which dedicated sub-query to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FolderQueryKind {
    /// Child folders of the current folder (facet request)
    #[default]
    Facets,
    /// Items stored directly in the current folder
    Results,
}

/// A dedicated sub-query scoped to one folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderQuery {
    /// Which sub-query this is
    #[serde(skip)]
    pub kind: FolderQueryKind,
    /// Page size
    pub number_of_results: u32,
    /// Free-text expression
    pub q: String,
    /// Filter expression
    pub aq: String,
    /// Facet requests
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<FacetRequest>,
}

impl FolderQuery {
    /// Query listing the child folders of `path`.
    ///
    /// Below the root the filter also pins the item level so that only the
    /// current folder's own items contribute facet values.
    #[must_use]
    pub fn facets(options: &FolderViewOptions, level: FolderLevel, path: &FolderPath) -> Self {
        let aq = if level.is_root() {
            folder_path_filter(options, path)
        } else {
            format!(
                "{} {}",
                folder_path_filter(options, path),
                item_level_filter(options, level)
            )
        };
        Self {
            kind: FolderQueryKind::Facets,
            number_of_results: options.folder_query_size,
            q: String::new(),
            aq,
            facets: vec![FacetRequest::folder_tree(options)],
        }
    }

    /// Query listing the items stored directly in `path`.
    #[must_use]
    pub fn results(options: &FolderViewOptions, level: FolderLevel, path: &FolderPath) -> Self {
        let level_filter = item_level_filter(options, level);
        let aq = if path.is_empty() {
            level_filter
        } else {
            format!("{} {level_filter}", folder_path_filter(options, path))
        };
        Self {
            kind: FolderQueryKind::Results,
            number_of_results: options.folder_query_size,
            q: MATCH_ALL_QUERY.to_string(),
            aq,
            facets: Vec::new(),
        }
    }

    /// Build the sub-query of the given kind.
    #[must_use]
    pub fn build(
        kind: FolderQueryKind,
        options: &FolderViewOptions,
        level: FolderLevel,
        path: &FolderPath,
    ) -> Self {
        match kind {
            FolderQueryKind::Facets => Self::facets(options, level, path),
            FolderQueryKind::Results => Self::results(options, level, path),
        }
    }
}
