use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use cardvault_core::ProgressState;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSyncRequest {
    owner_id: String,
    #[serde(default)]
    card_ids: Option<Vec<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSyncResponse {
    status: &'static str,
    total: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    owner_id: String,
}

/// Starts a background price update for an owner's cards.
async fn start_sync(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartSyncRequest>,
) -> ApiResult<(StatusCode, Json<StartSyncResponse>)> {
    if body.owner_id.trim().is_empty() {
        return Err(ApiError::BadRequest("ownerId is required".to_string()));
    }
    let started = state
        .price_sync_service
        .start_bulk_sync(&body.owner_id, body.card_ids)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(StartSyncResponse {
            status: "started",
            total: started.total,
        }),
    ))
}

/// Returns the latest progress snapshot; polled by clients during a run.
async fn sync_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<Json<ProgressState>> {
    Ok(Json(state.price_sync_service.status(&query.owner_id)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/prices/sync", post(start_sync))
        .route("/prices/sync/status", get(sync_status))
}
