//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::SelectorError;
use crate::vtex::VtexError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Platform API operation failed.
    #[error("Platform error: {0}")]
    Vtex(#[from] VtexError),

    /// Binding selector rejected the operation.
    #[error("Selector error: {0}")]
    Selector(#[from] SelectorError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Vtex(err) => vtex_status(err),
            Self::Selector(err) => match err {
                SelectorError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                SelectorError::UnknownBinding(_) | SelectorError::RouteNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                SelectorError::AlreadySelected(_) | SelectorError::InvalidPhase(_) => {
                    StatusCode::CONFLICT
                }
                SelectorError::Fetch(err) => vtex_status(err),
                SelectorError::Redirect(_) => StatusCode::BAD_GATEWAY,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

const fn vtex_status(err: &VtexError) -> StatusCode {
    match err {
        VtexError::NotFound(_) => StatusCode::NOT_FOUND,
        VtexError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        VtexError::Credentials(_) | VtexError::Url(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose upstream error details to clients
        let message = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Vtex(_) | Self::Selector(SelectorError::Fetch(_)) => {
                "External service error".to_string()
            }
            Self::Selector(SelectorError::Unavailable { .. }) => {
                "Binding selector unavailable".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("selector", "Binding selected", Some(&[("binding_id", "US")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
