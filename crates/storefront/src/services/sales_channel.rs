//! Sales Channel Updater.
//!
//! Moves a cart to another sales channel when the shopper switches binding.
//! The backend refuses to change the channel of a cart that has items, so a
//! non-empty cart gets its items re-added under the new channel instead; the
//! backend then reprices them for that channel.

use std::sync::Arc;

use async_trait::async_trait;
use binding_selector_core::{
    ClientPreferencesData, OrderForm, OrderFormId, OrderFormItem, SalesChannel,
};
use tracing::{debug, instrument};

use crate::vtex::VtexError;

/// Cart operations offered by the checkout backend.
#[async_trait]
pub trait CheckoutApi: Send + Sync {
    /// Read a cart.
    async fn get_order_form(&self, order_form_id: &OrderFormId) -> Result<OrderForm, VtexError>;

    /// Set the cart's sales channel together with its client preferences.
    ///
    /// Only valid while the cart is empty.
    async fn update_channel_and_preferences(
        &self,
        order_form_id: &OrderFormId,
        sales_channel: &SalesChannel,
        preferences: &ClientPreferencesData,
    ) -> Result<OrderForm, VtexError>;

    /// Add items to the cart under a sales channel.
    async fn re_add_items(
        &self,
        order_form_id: &OrderFormId,
        items: &[OrderFormItem],
        sales_channel: &SalesChannel,
    ) -> Result<OrderForm, VtexError>;
}

/// Switches a cart's sales channel.
#[derive(Clone)]
pub struct SalesChannelUpdater {
    checkout: Arc<dyn CheckoutApi>,
}

impl SalesChannelUpdater {
    #[must_use]
    pub fn new(checkout: Arc<dyn CheckoutApi>) -> Self {
        Self { checkout }
    }

    /// Move a cart to `sales_channel` and record the shopper's `locale`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the update,
    /// e.g. an item that isn't sold in the target channel.
    #[instrument(skip_all, fields(order_form_id = %order_form_id, sales_channel = %sales_channel))]
    pub async fn update_channel(
        &self,
        order_form_id: &OrderFormId,
        sales_channel: &SalesChannel,
        locale: &str,
    ) -> Result<OrderForm, VtexError> {
        let order_form = self.checkout.get_order_form(order_form_id).await?;

        if !order_form.has_items() {
            let preferences = order_form
                .client_preferences_data
                .unwrap_or_default()
                .with_locale(locale);

            debug!("Empty cart, updating channel and preferences directly");
            return self
                .checkout
                .update_channel_and_preferences(order_form_id, sales_channel, &preferences)
                .await;
        }

        debug!(items = order_form.items.len(), "Re-adding items under new channel");
        self.checkout
            .re_add_items(order_form_id, &order_form.items, sales_channel)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;

    /// A recorded checkout call.
    #[derive(Debug, Clone, PartialEq)]
    pub enum CheckoutCall {
        Get(OrderFormId),
        UpdateChannel {
            sales_channel: SalesChannel,
            preferences: ClientPreferencesData,
        },
        ReAddItems {
            sales_channel: SalesChannel,
            items: Vec<OrderFormItem>,
        },
    }

    /// In-memory checkout that records every call.
    pub struct FakeCheckout {
        pub order_form: OrderForm,
        pub reject_items: bool,
        pub calls: Mutex<Vec<CheckoutCall>>,
    }

    impl FakeCheckout {
        pub fn new(order_form: OrderForm) -> Self {
            Self {
                order_form,
                reject_items: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<CheckoutCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CheckoutApi for FakeCheckout {
        async fn get_order_form(
            &self,
            order_form_id: &OrderFormId,
        ) -> Result<OrderForm, VtexError> {
            self.calls
                .lock()
                .unwrap()
                .push(CheckoutCall::Get(order_form_id.clone()));
            Ok(self.order_form.clone())
        }

        async fn update_channel_and_preferences(
            &self,
            _order_form_id: &OrderFormId,
            sales_channel: &SalesChannel,
            preferences: &ClientPreferencesData,
        ) -> Result<OrderForm, VtexError> {
            self.calls.lock().unwrap().push(CheckoutCall::UpdateChannel {
                sales_channel: sales_channel.clone(),
                preferences: preferences.clone(),
            });
            Ok(OrderForm {
                client_preferences_data: Some(preferences.clone()),
                ..self.order_form.clone()
            })
        }

        async fn re_add_items(
            &self,
            _order_form_id: &OrderFormId,
            items: &[OrderFormItem],
            sales_channel: &SalesChannel,
        ) -> Result<OrderForm, VtexError> {
            self.calls.lock().unwrap().push(CheckoutCall::ReAddItems {
                sales_channel: sales_channel.clone(),
                items: items.to_vec(),
            });
            if self.reject_items {
                return Err(VtexError::Api {
                    status: 400,
                    message: "Item unavailable in sales channel".to_string(),
                });
            }
            Ok(self.order_form.clone())
        }
    }

    pub fn order_form(items: Vec<OrderFormItem>) -> OrderForm {
        OrderForm {
            id: OrderFormId::new("of-1"),
            items,
            client_preferences_data: None,
        }
    }

    pub fn item(sku: &str, quantity: u32) -> OrderFormItem {
        OrderFormItem {
            id: sku.to_string(),
            quantity,
            seller: "1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_cart_updates_channel_directly() {
        let checkout = Arc::new(FakeCheckout::new(order_form(vec![])));
        let updater = SalesChannelUpdater::new(checkout.clone());

        let result = updater
            .update_channel(&OrderFormId::new("of-1"), &SalesChannel::new("2"), "en-US")
            .await
            .unwrap();

        let calls = checkout.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], CheckoutCall::Get(OrderFormId::new("of-1")));

        let CheckoutCall::UpdateChannel {
            sales_channel,
            preferences,
        } = &calls[1]
        else {
            panic!("expected a direct channel update, got {:?}", calls[1]);
        };
        assert_eq!(sales_channel.as_str(), "2");
        assert_eq!(preferences.locale.as_deref(), Some("en-US"));
        assert_eq!(preferences.optin_newsletter, Some(false));

        let prefs = result.client_preferences_data.unwrap();
        assert_eq!(prefs.locale.as_deref(), Some("en-US"));
    }

    #[tokio::test]
    async fn test_empty_cart_keeps_existing_optin() {
        let mut cart = order_form(vec![]);
        cart.client_preferences_data = Some(ClientPreferencesData {
            locale: Some("pt-BR".to_string()),
            optin_newsletter: Some(true),
            ..ClientPreferencesData::default()
        });
        let checkout = Arc::new(FakeCheckout::new(cart));
        let updater = SalesChannelUpdater::new(checkout.clone());

        updater
            .update_channel(&OrderFormId::new("of-1"), &SalesChannel::new("2"), "en-US")
            .await
            .unwrap();

        let calls = checkout.calls();
        assert!(matches!(
            &calls[1],
            CheckoutCall::UpdateChannel { preferences, .. }
                if preferences.optin_newsletter == Some(true)
        ));
    }

    #[tokio::test]
    async fn test_cart_with_items_re_adds_items() {
        let items = vec![item("sku-1", 2), item("sku-2", 1)];
        let checkout = Arc::new(FakeCheckout::new(order_form(items.clone())));
        let updater = SalesChannelUpdater::new(checkout.clone());

        updater
            .update_channel(&OrderFormId::new("of-1"), &SalesChannel::new("3"), "es-MX")
            .await
            .unwrap();

        let calls = checkout.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[1],
            CheckoutCall::ReAddItems {
                sales_channel: SalesChannel::new("3"),
                items,
            }
        );
        assert!(
            !calls
                .iter()
                .any(|c| matches!(c, CheckoutCall::UpdateChannel { .. }))
        );
    }

    #[tokio::test]
    async fn test_rejected_items_surface_error() {
        let mut checkout = FakeCheckout::new(order_form(vec![item("sku-1", 1)]));
        checkout.reject_items = true;
        let updater = SalesChannelUpdater::new(Arc::new(checkout));

        let result = updater
            .update_channel(&OrderFormId::new("of-1"), &SalesChannel::new("3"), "es-MX")
            .await;

        assert!(matches!(result, Err(VtexError::Api { status: 400, .. })));
    }
}
