use super::repository;
use contracts::domain::a004_inventory_adjustment::{AdjustmentType, InventoryAdjustment};
use sea_orm::DatabaseConnection;

// Корректировки создаёт только движок (crate::engine::adjustment),
// сервис отдаёт read-доступ для HTTP-слоя.

/// Список корректировок магазина, новые первыми
pub async fn list_by_store(
    db: &DatabaseConnection,
    store_id: &str,
    upc: Option<&str>,
    adjustment_type: Option<AdjustmentType>,
    limit: u64,
) -> anyhow::Result<Vec<InventoryAdjustment>> {
    repository::list_by_store(db, store_id, upc, adjustment_type, limit).await
}
