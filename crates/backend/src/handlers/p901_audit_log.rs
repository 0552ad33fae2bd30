use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::projections::p901_audit_log::{AuditListRequest, AuditListResponse};
use serde_json::Value;

use super::engine_error_response;
use crate::projections::p901_audit_log::service;
use crate::routes::AppState;

/// GET /api/audit?store_id&category&action&upc&transaction_number&date_from&date_to&limit
pub async fn list(
    State(state): State<AppState>,
    Query(req): Query<AuditListRequest>,
) -> Result<Json<AuditListResponse>, (StatusCode, Json<Value>)> {
    match service::list(&state.db, req).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => Err(engine_error_response(err)),
    }
}
