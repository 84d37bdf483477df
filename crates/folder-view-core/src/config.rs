//! Folder view options
//!
//! One [`FolderViewOptions`] value configures every navigator variant: with or
//! without a toggle button, folder view on or off by default, and whether
//! folders are listed from the main query (post-filter) or from a dedicated
//! sub-query. Options are loaded from environment variables the same way the
//! search cache and fusion configs are.

use serde::{Deserialize, Serialize};

use crate::error::{FolderViewError, FolderViewResult};

/// Environment variable for the hierarchical folder facet field.
pub const FACET_FIELD_ENV: &str = "FV_FACET_FIELD";
/// Environment variable for the item level field.
pub const ITEM_LEVEL_FIELD_ENV: &str = "FV_ITEM_LEVEL_FIELD";
/// Environment variable enabling the view toggle.
pub const USE_TOGGLE_BUTTON_ENV: &str = "FV_USE_TOGGLE_BUTTON";
/// Environment variable selecting folder view as the initial mode.
pub const FOLDER_VIEW_BY_DEFAULT_ENV: &str = "FV_FOLDER_VIEW_BY_DEFAULT";
/// Environment variable selecting the folder listing strategy.
pub const QUERY_STRATEGY_ENV: &str = "FV_QUERY_STRATEGY";
/// Environment variable for the path segment delimiter.
pub const PATH_DELIMITER_ENV: &str = "FV_PATH_DELIMITER";
/// Environment variable for the dedicated sub-query page size.
pub const FOLDER_QUERY_SIZE_ENV: &str = "FV_FOLDER_QUERY_SIZE";

/// Default hierarchical folder facet field.
pub const DEFAULT_FACET_FIELD: &str = "dtdam_parentfolder_facet";
/// Default item level field.
pub const DEFAULT_ITEM_LEVEL_FIELD: &str = "dtdam_item_level";
/// Default path segment delimiter.
pub const DEFAULT_PATH_DELIMITER: char = '|';
/// Default number of results and facet values fetched by folder sub-queries.
pub const DEFAULT_FOLDER_QUERY_SIZE: u32 = 1000;

/// How the folder listing for the current level is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueryStrategy {
    /// One query sorted by item level, folders read from its facet section,
    /// results narrowed client-side
    #[default]
    PostFilter,
    /// A dedicated folder query scoped to the current path and level
    DedicatedQuery,
}

impl QueryStrategy {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "post_filter" | "post-filter" | "single" => Some(Self::PostFilter),
            "dedicated_query" | "dedicated-query" | "dual" => Some(Self::DedicatedQuery),
            _ => None,
        }
    }
}

impl std::fmt::Display for QueryStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PostFilter => write!(f, "post_filter"),
            Self::DedicatedQuery => write!(f, "dedicated_query"),
        }
    }
}

/// Options shared by every folder navigator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FolderViewOptions {
    /// Field holding the hierarchical parent-folder path (`@` prefix allowed)
    pub facet_field: String,
    /// Field holding an item's depth in the folder hierarchy (`@` prefix allowed)
    pub item_level_field: String,
    /// Whether the user can pin the mode with a toggle
    pub use_toggle_button: bool,
    /// Initial mode when the toggle is in use
    pub use_folder_view_by_default: bool,
    /// Folder listing strategy
    pub strategy: QueryStrategy,
    /// Reserved character joining path segments; must not appear in folder values
    pub delimiter: char,
    /// Page size for dedicated folder sub-queries
    pub folder_query_size: u32,
}

impl Default for FolderViewOptions {
    fn default() -> Self {
        Self {
            facet_field: DEFAULT_FACET_FIELD.to_string(),
            item_level_field: DEFAULT_ITEM_LEVEL_FIELD.to_string(),
            use_toggle_button: true,
            use_folder_view_by_default: true,
            strategy: QueryStrategy::default(),
            delimiter: DEFAULT_PATH_DELIMITER,
            folder_query_size: DEFAULT_FOLDER_QUERY_SIZE,
        }
    }
}

impl FolderViewOptions {
    /// Create options for the given folder and item level fields.
    #[must_use]
    pub fn new(facet_field: impl Into<String>, item_level_field: impl Into<String>) -> Self {
        Self {
            facet_field: facet_field.into(),
            item_level_field: item_level_field.into(),
            ..Self::default()
        }
    }

    /// Enable or disable the view toggle.
    #[must_use]
    pub const fn with_toggle_button(mut self, enabled: bool) -> Self {
        self.use_toggle_button = enabled;
        self
    }

    /// Choose the initial mode used by toggle-enabled navigators.
    #[must_use]
    pub const fn with_folder_view_by_default(mut self, enabled: bool) -> Self {
        self.use_folder_view_by_default = enabled;
        self
    }

    /// Choose the folder listing strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: QueryStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Load options from environment, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load options through an arbitrary key lookup.
    ///
    /// Unset or unparsable values keep their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let facet_field = lookup(FACET_FIELD_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.facet_field);
        let item_level_field = lookup(ITEM_LEVEL_FIELD_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.item_level_field);
        let use_toggle_button = lookup(USE_TOGGLE_BUTTON_ENV)
            .map_or(defaults.use_toggle_button, |v| {
                parse_bool(&v, defaults.use_toggle_button)
            });
        let use_folder_view_by_default = lookup(FOLDER_VIEW_BY_DEFAULT_ENV)
            .map_or(defaults.use_folder_view_by_default, |v| {
                parse_bool(&v, defaults.use_folder_view_by_default)
            });
        let strategy = lookup(QUERY_STRATEGY_ENV)
            .and_then(|v| QueryStrategy::parse(&v))
            .unwrap_or(defaults.strategy);
        let delimiter = lookup(PATH_DELIMITER_ENV)
            .and_then(|v| {
                let mut chars = v.trim().chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            })
            .unwrap_or(defaults.delimiter);
        let folder_query_size = lookup(FOLDER_QUERY_SIZE_ENV)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(defaults.folder_query_size);

        Self {
            facet_field,
            item_level_field,
            use_toggle_button,
            use_folder_view_by_default,
            strategy,
            delimiter,
            folder_query_size,
        }
    }

    /// Check that the options can drive a navigator.
    pub fn validate(&self) -> FolderViewResult<()> {
        if clean_field(&self.facet_field).is_empty() {
            return Err(FolderViewError::InvalidConfig(
                "facet field must not be empty".to_string(),
            ));
        }
        if clean_field(&self.item_level_field).is_empty() {
            return Err(FolderViewError::InvalidConfig(
                "item level field must not be empty".to_string(),
            ));
        }
        if self.delimiter.is_alphanumeric() || self.delimiter.is_whitespace() {
            return Err(FolderViewError::InvalidConfig(format!(
                "path delimiter {:?} must be a reserved punctuation character",
                self.delimiter
            )));
        }
        if self.folder_query_size == 0 {
            return Err(FolderViewError::InvalidConfig(
                "folder query size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Folder facet field without the `@` reference prefix.
    #[must_use]
    pub fn facet_field_name(&self) -> &str {
        clean_field(&self.facet_field)
    }

    /// Item level field without the `@` reference prefix.
    #[must_use]
    pub fn item_level_field_name(&self) -> &str {
        clean_field(&self.item_level_field)
    }
}

/// Strip the host's `@` field-reference prefix.
#[must_use]
pub fn clean_field(field: &str) -> &str {
    field.trim().trim_start_matches('@')
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => true,
        "0" | "false" | "f" | "no" | "n" => false,
        _ => default,
    }
}
