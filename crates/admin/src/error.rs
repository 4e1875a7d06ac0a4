//! Unified error handling for admin.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::FormError;
use crate::tenant::TenantError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Tenant query failed.
    #[error("Tenant error: {0}")]
    Tenant(#[from] TenantError),

    /// Submitted form is invalid.
    #[error("Invalid form: {0}")]
    Form(FormError),
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Tenant(e) => Self::Tenant(e),
            FormError::Repository(e) => Self::Database(e),
            other => Self::Form(other),
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Tenant(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Tenant(_) => StatusCode::BAD_GATEWAY,
            Self::Form(FormError::UnknownBinding(_)) => StatusCode::NOT_FOUND,
            Self::Form(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) => "Internal server error".to_string(),
            Self::Tenant(_) => "External service error".to_string(),
            Self::Form(err) => err.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
