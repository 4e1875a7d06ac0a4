//! Binding Filter.
//!
//! Decides which tenant bindings are offered to shoppers. Administrative
//! bindings (canonical address `host/admin...`) are never shown; the rule is
//! fixed and not configurable.

use std::collections::HashSet;

use crate::types::{Binding, FilteredBinding};

/// Path segment that marks an administrative binding.
const ADMIN_SEGMENT: &str = "admin";

/// Whether a canonical base address points at the admin.
///
/// Addresses may carry a scheme (`https://store.com/admin`) or not
/// (`store.com/admin`); the first path segment after the host decides.
#[must_use]
pub fn is_admin_binding(canonical_base_address: &str) -> bool {
    let without_scheme = canonical_base_address
        .split_once("://")
        .map_or(canonical_base_address, |(_, rest)| rest);

    without_scheme.split('/').nth(1) == Some(ADMIN_SEGMENT)
}

/// Project tenant bindings into the list shown by the selector.
///
/// Admin bindings are dropped and duplicate ids collapse onto their first
/// occurrence. Input order is preserved.
#[must_use]
pub fn filter_bindings(bindings: &[Binding]) -> Vec<FilteredBinding> {
    let mut seen = HashSet::new();

    bindings
        .iter()
        .filter(|binding| !is_admin_binding(&binding.canonical_base_address))
        .filter(|binding| seen.insert(binding.id.clone()))
        .map(FilteredBinding::from)
        .collect()
}
