//! Conversions from generated GraphQL types to core types.

use binding_selector_core::{AlternateRoute, Binding, BindingId, SalesChannel};

use super::queries::{get_alternate_hrefs, get_tenant_info};

/// Convert a tenant binding, lifting the sales channel out of the portal context.
pub fn convert_binding(binding: get_tenant_info::GetTenantInfoTenantInfoBindings) -> Binding {
    let sales_channel = binding
        .extra_context
        .and_then(|context| context.portal)
        .and_then(|portal| portal.sales_channel)
        .map(SalesChannel::from);

    Binding {
        id: BindingId::from(binding.id),
        default_locale: binding.default_locale,
        canonical_base_address: binding.canonical_base_address,
        sales_channel,
    }
}

/// Convert the alternate hrefs response. A missing `internal` entry means no routes.
pub fn convert_routes(data: get_alternate_hrefs::ResponseData) -> Vec<AlternateRoute> {
    data.internal
        .and_then(|internal| internal.routes)
        .unwrap_or_default()
        .into_iter()
        .map(|route| AlternateRoute {
            binding_id: BindingId::from(route.binding_id),
            path: route.path,
        })
        .collect()
}
