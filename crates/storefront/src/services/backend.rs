//! Platform-backed selector backend.

use std::sync::Arc;

use async_trait::async_trait;
use binding_selector_core::{
    AlternateRoute, Binding, OrderForm, OrderFormId, PageContext, SalesChannel,
};

use crate::config::VtexConfig;
use crate::vtex::{CheckoutClient, GraphqlClient, VtexError};

use super::sales_channel::{CheckoutApi, SalesChannelUpdater};
use super::selector::SelectorBackend;

/// [`SelectorBackend`] over the storefront GraphQL and checkout APIs.
#[derive(Clone)]
pub struct VtexSelectorBackend {
    graphql: GraphqlClient,
    checkout: Arc<dyn CheckoutApi>,
    updater: SalesChannelUpdater,
}

impl VtexSelectorBackend {
    /// Build the backend from platform configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client can't be built.
    pub fn new(config: &VtexConfig) -> Result<Self, VtexError> {
        let checkout: Arc<dyn CheckoutApi> = Arc::new(CheckoutClient::new(config)?);
        Ok(Self::with_checkout(GraphqlClient::new(config)?, checkout))
    }

    #[must_use]
    pub fn with_checkout(graphql: GraphqlClient, checkout: Arc<dyn CheckoutApi>) -> Self {
        Self {
            graphql,
            updater: SalesChannelUpdater::new(Arc::clone(&checkout)),
            checkout,
        }
    }
}

#[async_trait]
impl SelectorBackend for VtexSelectorBackend {
    async fn tenant_bindings(&self) -> Result<Vec<Binding>, VtexError> {
        let bindings = self.graphql.tenant_bindings().await?;
        Ok(bindings.as_ref().clone())
    }

    async fn order_form(&self, order_form_id: &OrderFormId) -> Result<OrderForm, VtexError> {
        self.checkout.get_order_form(order_form_id).await
    }

    async fn sales_channel_update_enabled(&self) -> Result<bool, VtexError> {
        self.graphql.sales_channel_update_enabled().await
    }

    async fn update_sales_channel(
        &self,
        order_form_id: &OrderFormId,
        sales_channel: &SalesChannel,
        locale: &str,
    ) -> Result<OrderFormId, VtexError> {
        let order_form = self
            .updater
            .update_channel(order_form_id, sales_channel, locale)
            .await?;
        Ok(order_form.id)
    }

    async fn alternate_routes(&self, page: &PageContext) -> Result<Vec<AlternateRoute>, VtexError> {
        self.graphql.alternate_routes(page).await
    }
}
