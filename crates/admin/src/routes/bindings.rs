//! Binding label routes.

use axum::{
    Json,
    extract::{Path, State},
};
use binding_selector_core::{BindingId, BindingsSaved};
use tracing::instrument;

use crate::error::Result;
use crate::services::{BindingFormSubmission, BindingsOverview};
use crate::state::AppState;

/// Storefront bindings with their saved labels.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<BindingsOverview>> {
    Ok(Json(state.binding_form().overview().await?))
}

/// Save labels and visibility for one binding.
///
/// Responds with the full saved array.
#[instrument(skip_all, fields(binding_id = %binding_id))]
pub async fn save(
    State(state): State<AppState>,
    Path(binding_id): Path<BindingId>,
    Json(submission): Json<BindingFormSubmission>,
) -> Result<Json<Vec<BindingsSaved>>> {
    let saved = state
        .binding_form()
        .submit(&binding_id, &submission)
        .await?;
    Ok(Json(saved))
}
