use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a002_product::Product;
use contracts::engine::{EngineError, ProductCreate, ProductUpdate, UpdatedProduct};
use serde::Deserialize;
use serde_json::Value;

use super::{engine_error_response, internal_error};
use crate::domain::a002_product as product;
use crate::engine::catalog;
use crate::routes::AppState;

#[derive(Deserialize)]
pub struct ListParams {
    pub store_id: String,
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/products?store_id&include_inactive
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Product>>, (StatusCode, Json<Value>)> {
    match product::service::list_by_store(&state.db, &params.store_id, params.include_inactive)
        .await
    {
        Ok(items) => Ok(Json(items)),
        Err(e) => Err(internal_error(e)),
    }
}

#[derive(Deserialize)]
pub struct StoreScope {
    pub store_id: String,
}

/// GET /api/products/:upc?store_id
pub async fn get_by_upc(
    State(state): State<AppState>,
    Path(upc): Path<String>,
    Query(params): Query<StoreScope>,
) -> Result<Json<Product>, (StatusCode, Json<Value>)> {
    match product::service::get_by_upc(&state.db, &params.store_id, &upc).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(engine_error_response(EngineError::ProductNotFound {
            store_id: params.store_id,
            upc,
        })),
        Err(e) => Err(internal_error(e)),
    }
}

/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<ProductCreate>,
) -> Result<Json<Product>, (StatusCode, Json<Value>)> {
    match catalog::create_product(&state.db, req).await {
        Ok(created) => Ok(Json(created)),
        Err(err) => Err(engine_error_response(err)),
    }
}

#[derive(Deserialize)]
pub struct UpdateBody {
    pub store_id: String,
    #[serde(flatten)]
    pub update: ProductUpdate,
}

/// PUT /api/products/:upc
pub async fn update(
    State(state): State<AppState>,
    Path(upc): Path<String>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<UpdatedProduct>, (StatusCode, Json<Value>)> {
    match catalog::update_product(&state.db, &body.store_id, &upc, body.update).await {
        Ok(updated) => Ok(Json(updated)),
        Err(err) => Err(engine_error_response(err)),
    }
}

/// POST /api/products/:upc/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    Path(upc): Path<String>,
    Json(body): Json<StoreScope>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    match catalog::deactivate(&state.db, &body.store_id, &upc).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) => Err(engine_error_response(err)),
    }
}

/// DELETE /api/products/:upc
pub async fn purge(
    State(state): State<AppState>,
    Path(upc): Path<String>,
    Json(body): Json<StoreScope>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    match catalog::purge_invalid_upc(&state.db, &body.store_id, &upc).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) => Err(engine_error_response(err)),
    }
}
