//! Checkout REST client.
//!
//! Order forms are mutable backend state and are never cached. A sales
//! channel is selected per request with the `sc` query parameter.

use std::sync::Arc;

use async_trait::async_trait;
use binding_selector_core::{
    ClientPreferencesData, OrderForm, OrderFormId, OrderFormItem, SalesChannel,
};
use serde::Serialize;
use tracing::instrument;
use url::Url;

use crate::config::VtexConfig;
use crate::services::sales_channel::CheckoutApi;

use super::{VtexError, http_client, truncate_body};

/// Client for the platform checkout API.
#[derive(Clone)]
pub struct CheckoutClient {
    inner: Arc<CheckoutClientInner>,
}

struct CheckoutClientInner {
    client: reqwest::Client,
    base_url: Url,
}

/// Body of the add-items call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderItemsRequest<'a> {
    order_items: &'a [OrderFormItem],
}

impl CheckoutClient {
    /// Create a new checkout client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(config: &VtexConfig) -> Result<Self, VtexError> {
        Ok(Self {
            inner: Arc::new(CheckoutClientInner {
                client: http_client(config)?,
                base_url: Url::parse(&config.checkout_url)?,
            }),
        })
    }

    /// URL of an order form resource, optionally scoped to a sales channel.
    fn order_form_url(
        &self,
        order_form_id: &OrderFormId,
        suffix: &[&str],
        sales_channel: Option<&SalesChannel>,
    ) -> Result<Url, VtexError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["api", "checkout", "pub", "orderForm", order_form_id.as_str()])
            .extend(suffix);

        if let Some(channel) = sales_channel {
            url.query_pairs_mut().append_pair("sc", channel.as_str());
        }

        Ok(url)
    }

    /// Decode an order form response, mapping failures to `VtexError`.
    async fn read_order_form(
        response: reqwest::Response,
        order_form_id: &OrderFormId,
    ) -> Result<OrderForm, VtexError> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(VtexError::NotFound(format!("order form {order_form_id}")));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(VtexError::RateLimited(1));
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %truncate_body(&body, 500),
                "Checkout API returned non-success status"
            );
            return Err(VtexError::Api {
                status: status.as_u16(),
                message: truncate_body(&body, 200),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl CheckoutApi for CheckoutClient {
    #[instrument(skip_all, fields(order_form_id = %order_form_id))]
    async fn get_order_form(&self, order_form_id: &OrderFormId) -> Result<OrderForm, VtexError> {
        let url = self.order_form_url(order_form_id, &[], None)?;
        let response = self.inner.client.get(url).send().await?;

        Self::read_order_form(response, order_form_id).await
    }

    #[instrument(skip_all, fields(order_form_id = %order_form_id, sales_channel = %sales_channel))]
    async fn update_channel_and_preferences(
        &self,
        order_form_id: &OrderFormId,
        sales_channel: &SalesChannel,
        preferences: &ClientPreferencesData,
    ) -> Result<OrderForm, VtexError> {
        let url = self.order_form_url(
            order_form_id,
            &["attachments", "clientPreferencesData"],
            Some(sales_channel),
        )?;
        let response = self
            .inner
            .client
            .post(url)
            .json(preferences)
            .send()
            .await?;

        Self::read_order_form(response, order_form_id).await
    }

    #[instrument(skip_all, fields(order_form_id = %order_form_id, sales_channel = %sales_channel, items = items.len()))]
    async fn re_add_items(
        &self,
        order_form_id: &OrderFormId,
        items: &[OrderFormItem],
        sales_channel: &SalesChannel,
    ) -> Result<OrderForm, VtexError> {
        let url = self.order_form_url(order_form_id, &["items"], Some(sales_channel))?;
        let response = self
            .inner
            .client
            .post(url)
            .json(&OrderItemsRequest { order_items: items })
            .send()
            .await?;

        Self::read_order_form(response, order_form_id).await
    }
}
