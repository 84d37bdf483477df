//! Query-state snapshot model
//!
//! The host owns the live query state; the navigator only ever sees a
//! [`QueryStateSnapshot`] of it. Keys follow the host's conventions: the
//! free-text query lives under `q`, and every facet filter lives under
//! `f:<field>` bound to its ordered list of selected values.
//!
//! Hosts key facet filters by the configured field reference, which may carry
//! the `@` prefix (`f:@folder`). Keys are canonicalized to the bare field name
//! on the way in, so `f:@folder` and `f:folder` address the same filter.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::clean_field;

/// Attribute key holding the free-text query.
pub const QUERY_KEY: &str = "q";
/// Prefix marking an attribute key as a facet filter.
pub const FACET_KEY_PREFIX: &str = "f:";

/// Build the facet-filter attribute key for a field.
#[must_use]
pub fn facet_key(field: &str) -> String {
    format!("{FACET_KEY_PREFIX}{}", clean_field(field))
}

/// Canonical form of a raw attribute key; only facet-filter keys change.
#[must_use]
pub fn canonical_key(key: &str) -> String {
    key.strip_prefix(FACET_KEY_PREFIX)
        .map_or_else(|| key.to_string(), facet_key)
}

/// A single attribute value in the query state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    /// Scalar attribute (free-text query, sort, layout, ...)
    Text(String),
    /// Ordered selection of a facet filter
    Values(Vec<String>),
}

impl StateValue {
    /// Selected values, empty for scalar attributes.
    #[must_use]
    pub fn as_values(&self) -> &[String] {
        match self {
            Self::Values(values) => values,
            Self::Text(_) => &[],
        }
    }

    /// Scalar text, empty for value lists.
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Values(_) => "",
        }
    }
}

/// Snapshot of the host's query state taken at the start of a query cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryStateSnapshot {
    attributes: BTreeMap<String, StateValue>,
}

impl<'de> Deserialize<'de> for QueryStateSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, StateValue>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

impl FromIterator<(String, StateValue)> for QueryStateSnapshot {
    /// Collect raw host attributes, canonicalizing facet keys.
    ///
    /// When two raw keys collapse onto one filter, a non-empty selection wins
    /// over an empty one.
    fn from_iter<I: IntoIterator<Item = (String, StateValue)>>(iter: I) -> Self {
        let mut attributes: BTreeMap<String, StateValue> = BTreeMap::new();
        for (key, value) in iter {
            let key = canonical_key(&key);
            let keep_existing = attributes
                .get(&key)
                .is_some_and(|existing| !existing.as_values().is_empty())
                && value.as_values().is_empty();
            if !keep_existing {
                attributes.insert(key, value);
            }
        }
        Self { attributes }
    }
}

impl QueryStateSnapshot {
    /// Create an empty snapshot (no query, no facet filters).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-text query.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.set_query(query);
        self
    }

    /// Select values for a facet filter.
    #[must_use]
    pub fn with_facet<I, S>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_facet(field, values.into_iter().map(Into::into).collect());
        self
    }

    /// Free-text query, empty when absent.
    #[must_use]
    pub fn query(&self) -> &str {
        self.attributes
            .get(QUERY_KEY)
            .map_or("", StateValue::as_text)
    }

    /// Replace the free-text query.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.attributes
            .insert(QUERY_KEY.to_string(), StateValue::Text(query.into()));
    }

    /// Selected values of a facet filter, empty when absent.
    #[must_use]
    pub fn facet_values(&self, field: &str) -> &[String] {
        self.attributes
            .get(&facet_key(field))
            .map(StateValue::as_values)
            .unwrap_or_default()
    }

    /// Replace the selected values of a facet filter.
    pub fn set_facet(&mut self, field: &str, values: Vec<String>) {
        self.attributes
            .insert(facet_key(field), StateValue::Values(values));
    }

    /// Iterate over `(field, selected values)` for every facet-filter key.
    pub fn facets(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.attributes.iter().filter_map(|(key, value)| {
            key.strip_prefix(FACET_KEY_PREFIX)
                .map(|field| (field, value.as_values()))
        })
    }

    /// Read any attribute by its raw key (`f:@x` and `f:x` are the same key).
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&StateValue> {
        self.attributes.get(&canonical_key(key))
    }

    /// Clear the free-text query and every facet filter except `keep_field`'s.
    ///
    /// Returns the number of facet filters that were cleared.
    pub fn reset_filters_except(&mut self, keep_field: &str) -> usize {
        self.set_query("");
        let keep_key = facet_key(keep_field);
        let mut cleared = 0;
        for (key, value) in &mut self.attributes {
            if key.starts_with(FACET_KEY_PREFIX)
                && *key != keep_key
                && !value.as_values().is_empty()
            {
                *value = StateValue::Values(Vec::new());
                cleared += 1;
            }
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_has_no_query_or_facets() {
        let state = QueryStateSnapshot::new();
        assert_eq!(state.query(), "");
        assert!(state.facet_values("folder").is_empty());
        assert_eq!(state.facets().count(), 0);
    }

    #[test]
    fn facet_key_strips_reference_prefix() {
        assert_eq!(facet_key("@folder"), "f:folder");
        let state = QueryStateSnapshot::new().with_facet("@folder", ["Docs"]);
        assert_eq!(state.facet_values("folder"), ["Docs".to_string()]);
    }

    #[test]
    fn deserializes_host_attribute_map() {
        let state: QueryStateSnapshot = serde_json::from_str(
            r#"{"q":"","f:folder":["Docs","Specs"],"f:author":[],"layout":"list"}"#,
        )
        .unwrap();
        assert_eq!(state.query(), "");
        assert_eq!(state.facet_values("folder").len(), 2);
        assert!(state.facet_values("author").is_empty());
        assert_eq!(
            state.attribute("layout"),
            Some(&StateValue::Text("list".into()))
        );
        assert_eq!(state.facets().count(), 2);
    }

    #[test]
    fn reset_keeps_folder_selection() {
        let mut state = QueryStateSnapshot::new()
            .with_query("budget")
            .with_facet("folder", ["Docs"])
            .with_facet("author", ["ann", "bob"])
            .with_facet("type", Vec::<String>::new());
        let cleared = state.reset_filters_except("@folder");
        assert_eq!(cleared, 1);
        assert_eq!(state.query(), "");
        assert_eq!(state.facet_values("folder"), ["Docs".to_string()]);
        assert!(state.facet_values("author").is_empty());
    }

    #[test]
    fn prefixed_host_keys_are_canonicalized() {
        let state: QueryStateSnapshot =
            serde_json::from_str(r#"{"q":"","f:@folder":["Docs"],"f:@author":[]}"#).unwrap();
        assert_eq!(state.facet_values("@folder"), ["Docs".to_string()]);
        assert_eq!(state.facet_values("folder"), ["Docs".to_string()]);
        assert_eq!(
            state.attribute("f:@folder"),
            Some(&StateValue::Values(vec!["Docs".into()]))
        );
        let fields: Vec<&str> = state.facets().map(|(field, _)| field).collect();
        assert_eq!(fields, ["author", "folder"]);
    }

    #[test]
    fn reset_keeps_prefixed_folder_selection() {
        let mut state: QueryStateSnapshot = serde_json::from_str(
            r#"{"q":"draft","f:@folder":["Docs","Specs"],"f:@author":["ann"]}"#,
        )
        .unwrap();
        let cleared = state.reset_filters_except("@folder");
        assert_eq!(cleared, 1);
        assert_eq!(state.facet_values("@folder").len(), 2);
        assert!(state.facet_values("@author").is_empty());
    }

    #[test]
    fn colliding_keys_prefer_a_selection() {
        let state: QueryStateSnapshot =
            serde_json::from_str(r#"{"f:@folder":["Docs"],"f:folder":[]}"#).unwrap();
        assert_eq!(state.facet_values("folder"), ["Docs".to_string()]);
        assert_eq!(state.facets().count(), 1);
    }

    #[test]
    fn serializes_transparently() {
        let state = QueryStateSnapshot::new()
            .with_query("x")
            .with_facet("folder", ["A"]);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["q"], "x");
        assert_eq!(json["f:folder"][0], "A");
    }
}
