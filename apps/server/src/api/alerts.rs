use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use cardvault_core::{CardStore, PriceAlert};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::main_lib::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAlertsQuery {
    owner_id: String,
    #[serde(default)]
    unread_only: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    owner_id: String,
}

async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListAlertsQuery>,
) -> ApiResult<Json<Vec<PriceAlert>>> {
    let alerts = state
        .card_repository
        .list_alerts(&query.owner_id, query.unread_only)?;
    Ok(Json(alerts))
}

async fn mark_alert_read(
    State(state): State<Arc<AppState>>,
    Path(alert_id): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<StatusCode> {
    state
        .card_repository
        .mark_alert_read(&query.owner_id, &alert_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/alerts", get(list_alerts))
        .route("/alerts/{id}/read", post(mark_alert_read))
}
