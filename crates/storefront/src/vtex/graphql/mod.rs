//! Storefront GraphQL client.
//!
//! Uses `graphql_client` for type-safe queries with `reqwest` for HTTP.
//! Tenant bindings and the sales channel flag are tenant-wide and cached
//! using `moka` (5-minute TTL); alternate routes depend on the page and are
//! always fetched.

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use binding_selector_core::{AlternateRoute, Binding, PageContext};
use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use tracing::{debug, instrument};

use crate::config::VtexConfig;

use super::{GraphQLError, VtexError, http_client, truncate_body};
use cache::{CacheKey, CacheValue};
use conversions::{convert_binding, convert_routes};
use queries::{
    GetAlternateHrefs, GetTenantInfo, IsSalesChannelUpdate, get_alternate_hrefs, get_tenant_info,
    is_sales_channel_update,
};

/// Client for the platform storefront GraphQL API.
#[derive(Clone)]
pub struct GraphqlClient {
    inner: Arc<GraphqlClientInner>,
}

struct GraphqlClientInner {
    client: reqwest::Client,
    endpoint: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl GraphqlClient {
    /// Create a new GraphQL client.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials can't be used as headers or the
    /// HTTP client fails to build.
    pub fn new(config: &VtexConfig) -> Result<Self, VtexError> {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(GraphqlClientInner {
                client: http_client(config)?,
                endpoint: config.graphql_url.clone(),
                cache,
            }),
        })
    }

    /// Execute a GraphQL query.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, VtexError>
    where
        Q::Variables: serde::Serialize,
    {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(VtexError::RateLimited(retry_after));
        }

        // Body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate_body(&response_text, 500),
                "GraphQL endpoint returned non-success status"
            );
            return Err(VtexError::GraphQL(vec![GraphQLError::message(format!(
                "HTTP {status}: {}",
                truncate_body(&response_text, 200)
            ))]));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %truncate_body(&response_text, 500),
                    "Failed to parse GraphQL response"
                );
                return Err(VtexError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");

            return Err(VtexError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        path: e.path.map_or_else(Vec::new, |p| {
                            p.into_iter()
                                .map(|fragment| match fragment {
                                    graphql_client::PathFragment::Key(s) => {
                                        serde_json::Value::String(s)
                                    }
                                    graphql_client::PathFragment::Index(i) => {
                                        serde_json::Value::Number(i.into())
                                    }
                                })
                                .collect()
                        }),
                    })
                    .collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %truncate_body(&response_text, 500),
                "GraphQL response has no data and no errors"
            );
            VtexError::GraphQL(vec![GraphQLError::message("No data in response")])
        })
    }

    /// Get every binding configured on the tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn tenant_bindings(&self) -> Result<Arc<Vec<Binding>>, VtexError> {
        if let Some(CacheValue::Bindings(bindings)) =
            self.inner.cache.get(&CacheKey::TenantBindings).await
        {
            debug!("Cache hit for tenant bindings");
            return Ok(bindings);
        }

        let data = self
            .execute::<GetTenantInfo>(get_tenant_info::Variables)
            .await?;

        let bindings: Arc<Vec<Binding>> = Arc::new(
            data.tenant_info
                .bindings
                .into_iter()
                .map(convert_binding)
                .collect(),
        );

        self.inner
            .cache
            .insert(
                CacheKey::TenantBindings,
                CacheValue::Bindings(Arc::clone(&bindings)),
            )
            .await;

        Ok(bindings)
    }

    /// Get the equivalent routes of a page on every binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(page_id = %page.id, page_type = %page.page_type))]
    pub async fn alternate_routes(
        &self,
        page: &PageContext,
    ) -> Result<Vec<AlternateRoute>, VtexError> {
        let variables = get_alternate_hrefs::Variables {
            id: page.id.clone(),
            page_type: page.page_type.clone(),
        };

        let data = self.execute::<GetAlternateHrefs>(variables).await?;

        Ok(convert_routes(data))
    }

    /// Whether a binding switch should also switch the cart's sales channel.
    ///
    /// An unset flag counts as disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn sales_channel_update_enabled(&self) -> Result<bool, VtexError> {
        if let Some(CacheValue::Flag(enabled)) =
            self.inner.cache.get(&CacheKey::SalesChannelUpdate).await
        {
            debug!("Cache hit for sales channel update flag");
            return Ok(enabled);
        }

        let data = self
            .execute::<IsSalesChannelUpdate>(is_sales_channel_update::Variables)
            .await?;
        let enabled = data.is_sales_channel_update.unwrap_or(false);

        self.inner
            .cache
            .insert(CacheKey::SalesChannelUpdate, CacheValue::Flag(enabled))
            .await;

        Ok(enabled)
    }
}
