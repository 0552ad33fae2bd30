pub mod a001_store;
pub mod a002_product;
pub mod a003_sale_transaction;
pub mod a004_inventory_adjustment;
pub mod p900_price_history;
pub mod p901_audit_log;

use axum::http::StatusCode;
use axum::Json;
use contracts::engine::EngineError;
use serde_json::{json, Value};

/// Единое сопоставление ошибок движка с HTTP-статусами
pub fn engine_error_response(err: EngineError) -> (StatusCode, Json<Value>) {
    let status = match &err {
        EngineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        EngineError::ProductNotFound { .. } => StatusCode::NOT_FOUND,
        EngineError::DuplicateUpc { .. } => StatusCode::CONFLICT,
        EngineError::NegativeInventory { .. } => StatusCode::CONFLICT,
        EngineError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Engine persistence error: {}", err);
    }
    (status, Json(json!({ "error": err.to_string() })))
}

pub fn bad_request(message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message.into() })),
    )
}

pub fn not_found(message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": message.into() })),
    )
}

pub fn internal_error(err: impl std::fmt::Display) -> (StatusCode, Json<Value>) {
    tracing::error!("Request failed: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal error" })),
    )
}
