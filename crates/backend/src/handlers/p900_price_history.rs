use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::projections::p900_price_history::{PriceHistoryListRequest, PriceHistoryListResponse};
use serde_json::Value;

use super::engine_error_response;
use crate::projections::p900_price_history::service;
use crate::routes::AppState;

/// GET /api/price-history?store_id&upc&date_from&date_to&limit
pub async fn list(
    State(state): State<AppState>,
    Query(req): Query<PriceHistoryListRequest>,
) -> Result<Json<PriceHistoryListResponse>, (StatusCode, Json<Value>)> {
    match service::list(&state.db, req).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => Err(engine_error_response(err)),
    }
}
