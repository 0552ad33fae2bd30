use axum::{
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;

use crate::handlers;

/// Состояние приложения: подключение к БД создаётся в main и
/// передаётся хендлерам через axum State
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // A001 Stores
        // ========================================
        .route(
            "/api/stores",
            get(handlers::a001_store::list_all).post(handlers::a001_store::upsert),
        )
        .route("/api/stores/:id", get(handlers::a001_store::get_by_id))
        // ========================================
        // A002 Products (каталог; записи только через движок)
        // ========================================
        .route(
            "/api/products",
            get(handlers::a002_product::list).post(handlers::a002_product::create),
        )
        .route(
            "/api/products/:upc",
            get(handlers::a002_product::get_by_upc)
                .put(handlers::a002_product::update)
                .delete(handlers::a002_product::purge),
        )
        .route(
            "/api/products/:upc/deactivate",
            post(handlers::a002_product::deactivate),
        )
        // ========================================
        // A003 Sales (чековая лента)
        // ========================================
        .route(
            "/api/sales",
            get(handlers::a003_sale_transaction::list)
                .post(handlers::a003_sale_transaction::create),
        )
        .route(
            "/api/sales/:transaction_number",
            get(handlers::a003_sale_transaction::get_by_number),
        )
        // ========================================
        // A004 Inventory adjustments
        // ========================================
        .route(
            "/api/inventory/adjustments",
            get(handlers::a004_inventory_adjustment::list)
                .post(handlers::a004_inventory_adjustment::create),
        )
        .route(
            "/api/inventory/reconciliations",
            post(handlers::a004_inventory_adjustment::reconcile),
        )
        // ========================================
        // P900 Price history / P901 Audit log
        // ========================================
        .route("/api/price-history", get(handlers::p900_price_history::list))
        .route("/api/audit", get(handlers::p901_audit_log::list))
        .with_state(state)
}
