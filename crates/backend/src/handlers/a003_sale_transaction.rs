use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a003_sale_transaction::SaleTransaction;
use contracts::engine::{SaleOutcome, SaleRequest};
use serde::Deserialize;
use serde_json::Value;

use super::{bad_request, internal_error, not_found};
use crate::domain::a003_sale_transaction as sale;
use crate::engine;
use crate::routes::AppState;
use crate::shared::dates::parse_date_param;

/// POST /api/sales
///
/// Возвращает зафиксированный чек вместе с предупреждениями о нехватке
/// остатков; повтор с тем же ключом идемпотентности — тот же чек.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<SaleRequest>,
) -> Result<Json<SaleOutcome>, (StatusCode, Json<Value>)> {
    match engine::sale::record_sale(&state.db, req).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(err) => Err(super::engine_error_response(err)),
    }
}

#[derive(Deserialize)]
pub struct ListParams {
    pub store_id: String,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub limit: Option<u64>,
}

/// GET /api/sales?store_id&date_from&date_to&limit
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<SaleTransaction>>, (StatusCode, Json<Value>)> {
    let date_from =
        parse_date_param(params.date_from.as_deref(), "date_from").map_err(bad_request)?;
    let date_to = parse_date_param(params.date_to.as_deref(), "date_to").map_err(bad_request)?;
    let limit = params.limit.unwrap_or(100);

    match sale::service::list_by_store(&state.db, &params.store_id, date_from, date_to, limit).await
    {
        Ok(items) => Ok(Json(items)),
        Err(e) => Err(internal_error(e)),
    }
}

/// GET /api/sales/:transaction_number
pub async fn get_by_number(
    State(state): State<AppState>,
    Path(transaction_number): Path<String>,
) -> Result<Json<SaleTransaction>, (StatusCode, Json<Value>)> {
    match sale::service::get_by_number(&state.db, &transaction_number).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(not_found(format!(
            "Transaction not found: {}",
            transaction_number
        ))),
        Err(e) => Err(internal_error(e)),
    }
}
