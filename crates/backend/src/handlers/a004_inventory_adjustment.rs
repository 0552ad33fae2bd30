use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a004_inventory_adjustment::{AdjustmentType, InventoryAdjustment};
use contracts::engine::{AdjustmentRequest, ReconcileRequest};
use serde::Deserialize;
use serde_json::Value;

use super::{bad_request, engine_error_response, internal_error};
use crate::domain::a004_inventory_adjustment as adjustment;
use crate::engine;
use crate::routes::AppState;

/// POST /api/inventory/adjustments
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<AdjustmentRequest>,
) -> Result<Json<InventoryAdjustment>, (StatusCode, Json<Value>)> {
    match engine::adjustment::adjust_inventory(&state.db, req).await {
        Ok(created) => Ok(Json(created)),
        Err(err) => Err(engine_error_response(err)),
    }
}

/// POST /api/inventory/reconciliations
pub async fn reconcile(
    State(state): State<AppState>,
    Json(req): Json<ReconcileRequest>,
) -> Result<Json<InventoryAdjustment>, (StatusCode, Json<Value>)> {
    match engine::adjustment::reconcile(&state.db, req).await {
        Ok(created) => Ok(Json(created)),
        Err(err) => Err(engine_error_response(err)),
    }
}

#[derive(Deserialize)]
pub struct ListParams {
    pub store_id: String,
    pub upc: Option<String>,
    pub adjustment_type: Option<String>,
    pub limit: Option<u64>,
}

/// GET /api/inventory/adjustments?store_id&upc&adjustment_type&limit
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<InventoryAdjustment>>, (StatusCode, Json<Value>)> {
    let adjustment_type = match params.adjustment_type.as_deref() {
        None | Some("") => None,
        Some(code) => match AdjustmentType::from_code(code) {
            Some(t) => Some(t),
            None => {
                return Err(bad_request(format!("unknown adjustment_type: {}", code)));
            }
        },
    };
    let limit = params.limit.unwrap_or(100);

    match adjustment::service::list_by_store(
        &state.db,
        &params.store_id,
        params.upc.as_deref(),
        adjustment_type,
        limit,
    )
    .await
    {
        Ok(items) => Ok(Json(items)),
        Err(e) => Err(internal_error(e)),
    }
}
