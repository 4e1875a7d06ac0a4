//! Cache types for storefront GraphQL responses.

use std::sync::Arc;

use binding_selector_core::Binding;

/// Cache key for tenant-wide data.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    TenantBindings,
    SalesChannelUpdate,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Bindings(Arc<Vec<Binding>>),
    Flag(bool),
}
