use super::repository;
use chrono::NaiveDate;
use contracts::domain::a003_sale_transaction::SaleTransaction;
use sea_orm::DatabaseConnection;

// Чеки создаёт только движок (crate::engine::sale), сервис отдаёт
// read-доступ для HTTP-слоя.

/// Список чеков магазина за период, новые первыми
pub async fn list_by_store(
    db: &DatabaseConnection,
    store_id: &str,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    limit: u64,
) -> anyhow::Result<Vec<SaleTransaction>> {
    repository::list_by_store(db, store_id, date_from, date_to, limit).await
}

/// Получение чека по номеру (TXN-...)
pub async fn get_by_number(
    db: &DatabaseConnection,
    transaction_number: &str,
) -> anyhow::Result<Option<SaleTransaction>> {
    repository::find_by_number(db, transaction_number).await
}
