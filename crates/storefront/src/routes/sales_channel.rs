//! Sales channel route handler.

use axum::{Json, extract::State};
use binding_selector_core::{OrderFormId, SalesChannel};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Body of the update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSalesChannelRequest {
    pub order_form_id: OrderFormId,
    pub sales_channel: SalesChannel,
    pub locale: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSalesChannelResponse {
    pub order_form_id: OrderFormId,
}

/// Move a cart to another sales channel.
#[instrument(skip(state, request), fields(order_form_id = %request.order_form_id))]
pub async fn update(
    State(state): State<AppState>,
    Json(request): Json<UpdateSalesChannelRequest>,
) -> Result<Json<UpdateSalesChannelResponse>> {
    if request.locale.trim().is_empty() {
        return Err(AppError::BadRequest("locale must not be empty".to_string()));
    }

    let order_form_id = state
        .backend()
        .update_sales_channel(
            &request.order_form_id,
            &request.sales_channel,
            &request.locale,
        )
        .await?;

    Ok(Json(UpdateSalesChannelResponse { order_form_id }))
}
