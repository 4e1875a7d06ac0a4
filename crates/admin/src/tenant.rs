//! Tenant bindings read from the platform GraphQL API.
//!
//! The admin form only needs binding identity and address, so this is a
//! smaller query than the storefront's and it is not cached: merchants expect
//! a freshly added binding to show up on reload.

use async_trait::async_trait;
use binding_selector_core::{Binding, BindingId, ClientError, platform_client};
use graphql_client::{GraphQLQuery, Response};
use thiserror::Error;
use tracing::instrument;

use crate::config::TenantConfig;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/tenant.graphql",
    response_derives = "Debug, Clone"
)]
pub struct GetTenantBindings;

/// Errors from the tenant query.
#[derive(Debug, Error)]
pub enum TenantError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GraphQL errors: {0}")]
    GraphQL(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid credentials: {0}")]
    Credentials(String),
}

impl From<ClientError> for TenantError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Build(e) => Self::Http(e),
            other => Self::Credentials(other.to_string()),
        }
    }
}

/// Source of the tenant's bindings.
#[async_trait]
pub trait TenantSource: Send + Sync {
    async fn bindings(&self) -> Result<Vec<Binding>, TenantError>;
}

/// GraphQL-backed [`TenantSource`].
#[derive(Clone)]
pub struct TenantClient {
    client: reqwest::Client,
    endpoint: String,
}

impl TenantClient {
    /// Create a new tenant client.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials can't be used as headers or the
    /// HTTP client fails to build.
    pub fn new(config: &TenantConfig) -> Result<Self, TenantError> {
        let client =
            platform_client(&config.app_key, &config.app_token, config.request_timeout)?;

        Ok(Self {
            client,
            endpoint: config.graphql_url.clone(),
        })
    }
}

#[async_trait]
impl TenantSource for TenantClient {
    #[instrument(skip(self))]
    async fn bindings(&self) -> Result<Vec<Binding>, TenantError> {
        let body = GetTenantBindings::build_query(get_tenant_bindings::Variables);
        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::error!(status = %status, "Tenant query returned non-success status");
            return Err(TenantError::GraphQL(format!("HTTP {status}")));
        }

        let response: Response<get_tenant_bindings::ResponseData> = serde_json::from_str(&text)?;
        parse_bindings(response)
    }
}

/// Turn a GraphQL response into bindings, surfacing any reported errors.
fn parse_bindings(
    response: Response<get_tenant_bindings::ResponseData>,
) -> Result<Vec<Binding>, TenantError> {
    if let Some(errors) = response.errors
        && !errors.is_empty()
    {
        let message = errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(TenantError::GraphQL(message));
    }

    let data = response
        .data
        .ok_or_else(|| TenantError::GraphQL("No data in response".to_string()))?;

    Ok(data
        .tenant_info
        .bindings
        .into_iter()
        .map(|binding| Binding {
            id: BindingId::from(binding.id),
            default_locale: binding.default_locale,
            canonical_base_address: binding.canonical_base_address,
            sales_channel: None,
        })
        .collect())
}
