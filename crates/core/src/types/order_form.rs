//! Cart (order form) types owned by the checkout backend.
//!
//! Only the fields the selector reads or writes are modeled. Everything else
//! the backend sends in `clientPreferencesData` is carried through untouched
//! so a preferences update never drops data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::OrderFormId;

/// The checkout backend's shopping cart aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderForm {
    #[serde(rename = "orderFormId")]
    pub id: OrderFormId,
    #[serde(default)]
    pub items: Vec<OrderFormItem>,
    #[serde(default)]
    pub client_preferences_data: Option<ClientPreferencesData>,
}

/// A cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFormItem {
    /// SKU id.
    pub id: String,
    pub quantity: u32,
    pub seller: String,
}

/// Shopper preferences stored on the cart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPreferencesData {
    pub locale: Option<String>,
    // Backend spelling.
    #[serde(rename = "optinNewsLetter")]
    pub optin_newsletter: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClientPreferencesData {
    /// Merge a new locale into the preferences.
    ///
    /// The newsletter opt-in is normalized to `false` when absent, since the
    /// backend rejects preference updates without it.
    #[must_use]
    pub fn with_locale(self, locale: &str) -> Self {
        Self {
            locale: Some(locale.to_string()),
            optin_newsletter: Some(self.optin_newsletter.unwrap_or(false)),
            extra: self.extra,
        }
    }
}

impl OrderForm {
    /// Whether the cart has any line items.
    #[must_use]
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }
}
