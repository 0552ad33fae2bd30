use axum::extract::{Path, State};
use axum::Json;
use contracts::domain::a001_store::StoreId;
use contracts::domain::common::AggregateId;
use serde_json::json;

use crate::domain::a001_store;
use crate::routes::AppState;

/// GET /api/stores
pub async fn list_all(
    State(state): State<AppState>,
) -> Result<Json<Vec<contracts::domain::a001_store::Store>>, axum::http::StatusCode> {
    match a001_store::service::list_all(&state.db).await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/stores/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<contracts::domain::a001_store::Store>, axum::http::StatusCode> {
    let store_id =
        StoreId::from_string(&id).map_err(|_| axum::http::StatusCode::BAD_REQUEST)?;
    match a001_store::service::get_by_id(&state.db, store_id.value()).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/stores
pub async fn upsert(
    State(state): State<AppState>,
    Json(dto): Json<contracts::domain::a001_store::StoreDto>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    let result = if dto.id.is_some() {
        a001_store::service::update(&state.db, dto)
            .await
            .map(|_| uuid::Uuid::nil().to_string())
    } else {
        a001_store::service::create(&state.db, dto)
            .await
            .map(|id| id.to_string())
    };

    match result {
        Ok(id) => Ok(Json(json!({ "id": id }))),
        Err(e) => {
            tracing::error!("Store upsert failed: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
