//! Result payload model
//!
//! [`ResultPayload`] mirrors what the search engine hands back on the
//! result-ready boundary: the ranked [`ResultItem`]s plus one [`FacetEntry`]
//! per requested facet. Hierarchical facets carry a tree of
//! [`FacetValueNode`]s that is rebuilt on every response and only ever read.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::clean_field;
use crate::tracker::FolderLevel;

/// Selection state of a facet value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FacetValueState {
    /// Not selected
    #[default]
    Idle,
    /// Selected by the current query state
    Selected,
}

/// A node of a hierarchical facet tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetValueNode {
    /// Value label (one folder name)
    pub value: String,
    /// Selection state
    #[serde(default)]
    pub state: FacetValueState,
    /// Number of matching results, when the engine reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_results: Option<u64>,
    /// Child values, in engine order
    #[serde(default)]
    pub children: Vec<Self>,
}

impl FacetValueNode {
    /// Create an idle leaf value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            state: FacetValueState::Idle,
            number_of_results: None,
            children: Vec::new(),
        }
    }

    /// Mark the value as selected.
    #[must_use]
    pub const fn selected(mut self) -> Self {
        self.state = FacetValueState::Selected;
        self
    }

    /// Attach child values.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    /// Whether the value is selected.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.state == FacetValueState::Selected
    }
}

/// One facet section of a result payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetEntry {
    /// Field the facet was computed on (no `@` prefix)
    pub field: String,
    /// Request identifier echoed by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_id: Option<String>,
    /// Top-level values
    #[serde(default)]
    pub values: Vec<FacetValueNode>,
}

impl FacetEntry {
    /// Create a facet section for `field`.
    #[must_use]
    pub fn new(field: impl Into<String>, values: Vec<FacetValueNode>) -> Self {
        Self {
            field: field.into(),
            facet_id: None,
            values,
        }
    }
}

/// A single search result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Link to the item
    #[serde(default)]
    pub click_uri: String,
    /// Raw index fields, including the item level field
    #[serde(default)]
    pub raw: Map<String, Value>,
}

impl ResultItem {
    /// Create a result with a title and no raw fields.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set a raw field.
    #[must_use]
    pub fn with_raw(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.raw.insert(clean_field(field).to_string(), value.into());
        self
    }

    /// Item level read from `field`.
    ///
    /// Accepts a JSON number or a numeric string with a whole value (`2`,
    /// `2.0`, `"2"`); anything else (absent, zero, negative, fractional,
    /// non-numeric) yields `None`.
    #[must_use]
    pub fn item_level(&self, field: &str) -> Option<FolderLevel> {
        let raw = self.raw.get(clean_field(field))?;
        let level = match raw {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(whole_level)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<u64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(whole_level))
            }
            _ => None,
        }?;
        FolderLevel::new(u32::try_from(level).ok()?)
    }
}

#[allow(
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn whole_level(value: f64) -> Option<u64> {
    (value.fract() == 0.0 && value >= 1.0 && value <= f64::from(u32::MAX)).then_some(value as u64)
}

/// Everything returned by one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPayload {
    /// Ranked results
    #[serde(default)]
    pub results: Vec<ResultItem>,
    /// Facet sections
    #[serde(default)]
    pub facets: Vec<FacetEntry>,
    /// Total number of matches reported by the engine
    #[serde(default)]
    pub total_count: u64,
}

impl ResultPayload {
    /// Facet section computed on `field` (`@` prefix ignored).
    #[must_use]
    pub fn facet(&self, field: &str) -> Option<&FacetEntry> {
        let wanted = clean_field(field);
        self.facets.iter().find(|entry| clean_field(&entry.field) == wanted)
    }
}
