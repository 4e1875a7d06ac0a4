//! Binding selector route handlers.
//!
//! Each request drives a fresh selector for the shopper's page. Tenant data
//! and the sales channel flag come from the client cache, so mounting per
//! request only costs the cart read.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use binding_selector_core::BindingId;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{Result, add_breadcrumb};
use crate::services::{BindingSelector, Navigation, SelectorContext, SelectorError};
use crate::state::AppState;

/// Body of the select request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    #[serde(flatten)]
    pub context: SelectorContext,
    pub binding_id: BindingId,
}

fn selector(state: &AppState, context: SelectorContext) -> BindingSelector {
    BindingSelector::new(state.backend(), context, state.config().selector)
}

/// Load the selector for a page.
///
/// Responds with the selector view, or `204 No Content` when the selector
/// can't be shown.
#[instrument(skip(state, context), fields(order_form_id = %context.order_form_id))]
pub async fn mount(
    State(state): State<AppState>,
    Json(context): Json<SelectorContext>,
) -> Result<Response> {
    let mut selector = selector(&state, context);

    match selector.mount().await {
        Ok(()) => {}
        Err(SelectorError::Unavailable { .. }) => {
            debug!("Selector unavailable, rendering nothing");
            return Ok(StatusCode::NO_CONTENT.into_response());
        }
        Err(e) => return Err(e.into()),
    }

    Ok(selector.view().map_or_else(
        || StatusCode::NO_CONTENT.into_response(),
        |view| Json(view).into_response(),
    ))
}

/// Switch the shopper to another binding.
///
/// Responds with the URL to navigate to and the cart update outcome.
#[instrument(skip(state, request), fields(binding_id = %request.binding_id))]
pub async fn select(
    State(state): State<AppState>,
    Json(request): Json<SelectRequest>,
) -> Result<Json<Navigation>> {
    let mut selector = selector(&state, request.context);
    selector.mount().await?;

    let navigation = selector.select(&request.binding_id).await?;

    add_breadcrumb(
        "selector",
        "Binding selected",
        Some(&[
            ("binding_id", navigation.binding_id.as_str()),
            ("url", navigation.url.as_str()),
        ]),
    );

    Ok(Json(navigation))
}
