//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Health check
//!
//! # Binding selector (JSON)
//! POST /api/binding-selector          - Selector view for a page (204 if unavailable)
//! POST /api/binding-selector/select   - Switch binding, returns navigation URL
//!
//! # Cart
//! POST /api/sales-channel             - Move a cart to another sales channel
//! ```

pub mod sales_channel;
pub mod selector;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the binding selector routes router.
pub fn selector_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(selector::mount))
        .route("/select", post(selector::select))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/binding-selector", selector_routes())
        .route("/api/sales-channel", post(sales_channel::update))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
