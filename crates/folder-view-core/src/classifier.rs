//! Vanilla-state classification
//!
//! A snapshot is "vanilla" when the user has not narrowed the result set by
//! anything other than the folder facet itself. Only vanilla states may be
//! shown as folders.

use crate::config::clean_field;
use crate::state::QueryStateSnapshot;

/// Returns `true` when the snapshot has no free-text query and no selected
/// values on any facet other than `facet_field`.
#[must_use]
pub fn is_vanilla(state: &QueryStateSnapshot, facet_field: &str) -> bool {
    if !state.query().is_empty() {
        return false;
    }
    let folder = clean_field(facet_field);
    !state
        .facets()
        .any(|(field, values)| field != folder && !values.is_empty())
}
