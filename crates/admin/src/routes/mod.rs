//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                   - Liveness check
//! GET  /health/ready             - Database connectivity check
//!
//! # Binding labels (JSON)
//! GET  /api/bindings             - Storefront bindings and saved records
//! POST /api/bindings/{bindingId} - Save labels and visibility for a binding
//! ```

pub mod bindings;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the admin API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/api/bindings", get(bindings::index))
        .route("/api/bindings/{binding_id}", post(bindings::save))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Some(pool) = state.pool() else {
        return StatusCode::OK;
    };

    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::db::binding_info::tests::MemoryStore;
    use crate::services::binding_form::tests::{FakeTenant, tenant};

    fn app(store: Arc<MemoryStore>) -> Router {
        routes().with_state(AppState::with_ports(store, Arc::new(FakeTenant(tenant()))))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post(uri: &str, body: &Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let store = Arc::new(MemoryStore::default());
        for uri in ["/health", "/health/ready"] {
            let response = app(store.clone())
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_list_bindings() {
        let (status, body) = send(
            app(Arc::new(MemoryStore::default())),
            Request::get("/api/bindings").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bindings"].as_array().unwrap().len(), 2);
        assert_eq!(body["saved"], json!([]));
    }

    #[tokio::test]
    async fn test_save_binding_labels() {
        let store = Arc::new(MemoryStore::default());
        let (status, body) = send(
            app(store.clone()),
            post(
                "/api/bindings/BR",
                &json!({ "show": { "BR": true, "US": true }, "labels": { "BR": "Brasil", "US": "USA" } }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["bindingId"], "BR");
        assert_eq!(body[0]["show"], true);
        assert_eq!(body[0]["translatedLocales"][1]["label"], "USA");
        assert_eq!(store.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_rejects_missing_label() {
        let (status, body) = send(
            app(Arc::new(MemoryStore::default())),
            post("/api/bindings/BR", &json!({ "show": { "US": true } })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["error"],
            "Invalid form: label required for visible binding: US"
        );
    }

    #[tokio::test]
    async fn test_save_unknown_binding() {
        let (status, _) = send(
            app(Arc::new(MemoryStore::default())),
            post("/api/bindings/ADMIN", &json!({})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
