//! Commerce platform clients.
//!
//! # Architecture
//!
//! - Uses `graphql_client` for type-safe GraphQL queries, sent with `reqwest`
//! - The platform is the source of truth - nothing is stored locally
//! - Tenant bindings and the sales channel flag are cached via `moka` (5 minute TTL)
//!
//! # APIs
//!
//! ## Storefront GraphQL
//! - Tenant info (bindings)
//! - Alternate routes of a page across bindings
//! - Sales channel update flag (app settings)
//!
//! ## Checkout REST
//! - Read the order form (cart)
//! - Update client preferences under a sales channel
//! - Re-add items under a sales channel
//!
//! # Example
//!
//! ```rust,ignore
//! use binding_selector_storefront::vtex::{CheckoutClient, GraphqlClient};
//!
//! let graphql = GraphqlClient::new(&config.vtex)?;
//! let bindings = graphql.tenant_bindings().await?;
//!
//! let checkout = CheckoutClient::new(&config.vtex)?;
//! let order_form = checkout.get_order_form(&order_form_id).await?;
//! ```

mod checkout;
mod graphql;

pub use checkout::CheckoutClient;
pub use graphql::GraphqlClient;

use binding_selector_core::{ClientError, platform_client};
use thiserror::Error;

use crate::config::VtexConfig;

/// Errors that can occur when talking to the platform.
#[derive(Debug, Error)]
pub enum VtexError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// REST API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Credentials could not be turned into request headers.
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the platform.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl From<ClientError> for VtexError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Build(e) => Self::Http(e),
            other => Self::Credentials(other.to_string()),
        }
    }
}

/// A GraphQL error returned by the platform.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: vec![],
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Build an HTTP client carrying the app key/token headers.
fn http_client(config: &VtexConfig) -> Result<reqwest::Client, VtexError> {
    Ok(platform_client(
        &config.app_key,
        &config.app_token,
        config.request_timeout,
    )?)
}

/// Truncate an upstream response body for logs and error messages.
fn truncate_body(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}
