//! Folder view navigation for faceted search interfaces
//!
//! This crate turns a hierarchical folder facet into a browsable folder view
//! layered over an ordinary search page:
//! - [`is_vanilla`]: classify a query state as plain browsing or a search
//! - [`compute_level_and_path`]: derive the current folder from the facet selection
//! - [`shape_query`]: sort by item level and tag the request context
//! - [`partition`]: split a payload into child folders and same-level results
//! - [`FolderNavigator`]: the per-cycle state machine, toggle and folder clicks
//!
//! Rendering, analytics and query execution stay with the host, behind the
//! [`FolderRenderer`], [`AnalyticsSink`] and [`QueryExecutor`] traits.

#![forbid(unsafe_code)]

pub mod classifier;
pub mod config;
pub mod error;
pub mod host;
pub mod navigator;
pub mod partition;
pub mod query;
pub mod results;
pub mod state;
pub mod tracker;

// Re-export key types
pub use classifier::is_vanilla;
pub use config::{
    DEFAULT_FACET_FIELD, DEFAULT_FOLDER_QUERY_SIZE, DEFAULT_ITEM_LEVEL_FIELD,
    DEFAULT_PATH_DELIMITER, FolderViewOptions, QueryStrategy, clean_field,
};
pub use error::{FolderViewError, FolderViewResult};
pub use host::{
    AnalyticsSink, CountingExecutor, FolderRenderer, NavigationCause, NavigationEvent,
    NavigationEventKind, QueryExecutor, RecordingAnalytics, RecordingRenderer, RenderCall,
};
pub use navigator::{CycleOutcome, FolderNavigator, FolderQueryOutcome, RequestContext};
pub use partition::{
    FolderListing, FolderTile, Partition, child_folders, filter_by_level, partition,
};
pub use query::{
    FOLDER_FACET_REQUEST_ID, FacetRequest, FacetSortCriteria, FacetType, FolderQuery,
    FolderQueryKind, MATCH_ALL_QUERY, NavigationMode, OutgoingQuery, QueryBuilder,
    VANILLA_STATE_CONTEXT_KEY, folder_path_filter, item_level_filter, item_level_sort,
    shape_query,
};
pub use results::{FacetEntry, FacetValueNode, FacetValueState, ResultItem, ResultPayload};
pub use state::{
    FACET_KEY_PREFIX, QUERY_KEY, QueryStateSnapshot, StateValue, canonical_key, facet_key,
};
pub use tracker::{FolderLevel, FolderPath, compute_level_and_path};
