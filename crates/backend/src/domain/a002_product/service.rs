use super::repository;
use contracts::domain::a002_product::Product;
use sea_orm::DatabaseConnection;

// Записи каталога создаёт и изменяет только движок (crate::engine::catalog),
// сервис отдаёт read-доступ для HTTP-слоя.

/// Список товаров магазина (по умолчанию только активные)
pub async fn list_by_store(
    db: &DatabaseConnection,
    store_id: &str,
    include_inactive: bool,
) -> anyhow::Result<Vec<Product>> {
    repository::list_by_store(db, store_id, include_inactive).await
}

/// Получение товара по идентичности (store_id, upc)
pub async fn get_by_upc(
    db: &DatabaseConnection,
    store_id: &str,
    upc: &str,
) -> anyhow::Result<Option<Product>> {
    repository::find_by_upc(db, store_id, upc).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

    #[tokio::test]
    async fn test_inactive_products_hidden_by_default() {
        let db = connect_in_memory().await.unwrap();

        for (upc, active) in [("100001", true), ("100002", false)] {
            let mut product = Product::new_for_insert(
                "store-a".into(),
                upc.into(),
                format!("Товар {}", upc),
                1.0,
                0.5,
                None,
                None,
                5,
                None,
            );
            product.is_active = active;
            repository::insert(&db, &product).await.unwrap();
        }

        let visible = list_by_store(&db, "store-a", false).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].upc, "100001");

        let all = list_by_store(&db, "store-a", true).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
