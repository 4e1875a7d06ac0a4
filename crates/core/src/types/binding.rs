//! Binding types.
//!
//! A binding is one storefront configuration of the tenant: a locale, a
//! canonical host+path and the sales channel (catalog/pricing partition)
//! used by the commerce backend.

use serde::{Deserialize, Serialize};

use super::id::{BindingId, SalesChannel};

/// A storefront binding as configured on the tenant.
///
/// Sourced from tenant configuration and never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// Binding identifier.
    pub id: BindingId,
    /// Default locale (e.g., `en-US`).
    pub default_locale: String,
    /// Canonical host and path prefix (e.g., `store.com/us`).
    pub canonical_base_address: String,
    /// Sales channel of the binding's portal context, if any.
    pub sales_channel: Option<SalesChannel>,
}

/// A binding projected for display in the selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredBinding {
    pub id: BindingId,
    /// Display label, derived from the default locale.
    pub label: String,
    pub sales_channel: Option<SalesChannel>,
    pub default_locale: String,
    pub canonical_base_address: String,
}

impl From<&Binding> for FilteredBinding {
    fn from(binding: &Binding) -> Self {
        Self {
            id: binding.id.clone(),
            label: binding.default_locale.clone(),
            sales_channel: binding.sales_channel.clone(),
            default_locale: binding.default_locale.clone(),
            canonical_base_address: binding.canonical_base_address.clone(),
        }
    }
}

/// The equivalent page of the current navigation context on another binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternateRoute {
    pub binding_id: BindingId,
    pub path: String,
}

/// Identity of the page the shopper is currently on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    /// Page entity id (product id, category id, ...).
    pub id: String,
    /// Page entity type (e.g., `product`, `route`).
    #[serde(rename = "type")]
    pub page_type: String,
}

/// A merchant-provided label for one binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedLocale {
    pub id: BindingId,
    pub label: String,
    pub default_locale: String,
    pub canonical_base_address: String,
}

/// Persisted admin configuration for one binding.
///
/// The persisted collection holds at most one record per `binding_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingsSaved {
    pub binding_id: BindingId,
    /// Whether the binding is offered in the selector.
    pub show: bool,
    pub translated_locales: Vec<TranslatedLocale>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filtered_binding_label_from_locale() {
        let binding = Binding {
            id: BindingId::new("US"),
            default_locale: "en-US".to_string(),
            canonical_base_address: "store.com/us".to_string(),
            sales_channel: Some(SalesChannel::new("2")),
        };

        let filtered = FilteredBinding::from(&binding);
        assert_eq!(filtered.label, "en-US");
        assert_eq!(filtered.sales_channel, Some(SalesChannel::new("2")));
    }

    #[test]
    fn test_bindings_saved_wire_format() {
        let json = serde_json::json!({
            "bindingId": "BR",
            "show": true,
            "translatedLocales": [{
                "id": "US",
                "label": "English",
                "defaultLocale": "en-US",
                "canonicalBaseAddress": "store.com/us"
            }]
        });

        let saved: BindingsSaved = serde_json::from_value(json).unwrap();
        assert_eq!(saved.binding_id.as_str(), "BR");
        assert!(saved.show);
        assert_eq!(saved.translated_locales[0].label, "English");
    }

    #[test]
    fn test_page_context_uses_type_key() {
        let page: PageContext =
            serde_json::from_value(serde_json::json!({ "id": "42", "type": "product" })).unwrap();
        assert_eq!(page.page_type, "product");
    }
}
