use super::repository;
use contracts::domain::a002_product::Product;
use contracts::engine::EngineError;
use contracts::projections::p900_price_history::{
    PriceHistoryEntry, PriceHistoryListRequest, PriceHistoryListResponse,
};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use uuid::Uuid;

use crate::shared::dates::parse_date_param;

/// Собрать запись истории по товару и прежним значениям цены/себестоимости.
/// Процент изменения не считается от нулевой старой цены.
pub fn build_entry(
    product: &Product,
    old_price: f64,
    old_cost: f64,
    actor_id: Option<String>,
    change_reason: &str,
) -> PriceHistoryEntry {
    let price_change_percent = if old_price == 0.0 {
        None
    } else {
        Some((product.price - old_price) / old_price * 100.0)
    };

    PriceHistoryEntry {
        id: Uuid::new_v4().to_string(),
        store_id: product.store_id.clone(),
        product_id: product.to_string_id(),
        upc: product.upc.clone(),
        product_name: product.base.description.clone(),
        old_price,
        new_price: product.price,
        old_cost,
        new_cost: product.cost,
        price_change_percent,
        actor_id,
        change_reason: change_reason.to_string(),
        created_at: chrono::Utc::now(),
    }
}

/// Записать событие изменения цены
pub async fn append<C: ConnectionTrait>(db: &C, entry: &PriceHistoryEntry) -> anyhow::Result<()> {
    repository::insert(db, entry).await
}

/// Получить историю цен магазина с фильтрами
pub async fn list(
    db: &DatabaseConnection,
    req: PriceHistoryListRequest,
) -> Result<PriceHistoryListResponse, EngineError> {
    if req.store_id.trim().is_empty() {
        return Err(EngineError::invalid("store_id is required"));
    }
    let date_from =
        parse_date_param(req.date_from.as_deref(), "date_from").map_err(EngineError::invalid)?;
    let date_to =
        parse_date_param(req.date_to.as_deref(), "date_to").map_err(EngineError::invalid)?;

    let (items, total_count) = repository::list_with_filters(
        db,
        &req.store_id,
        req.upc.as_deref(),
        date_from,
        date_to,
        req.limit,
    )
    .await
    .map_err(EngineError::persistence)?;

    Ok(PriceHistoryListResponse {
        has_more: (items.len() as i32) < total_count,
        total_count,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

    fn product(store_id: &str, upc: &str, price: f64) -> Product {
        Product::new_for_insert(
            store_id.to_string(),
            upc.to_string(),
            format!("Товар {}", upc),
            price,
            1.0,
            None,
            None,
            0,
            None,
        )
    }

    #[test]
    fn test_build_entry_percent() {
        let p = product("store-a", "200001", 12.0);

        let created = build_entry(&p, 0.0, 0.0, None, "Создание товара");
        assert_eq!(created.price_change_percent, None);
        assert_eq!(created.new_price, 12.0);

        let changed = build_entry(&p, 10.0, 1.0, Some("user-1".into()), "Изменение цены");
        let percent = changed.price_change_percent.unwrap();
        assert!((percent - 20.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_list_is_store_scoped_and_paginated() {
        let db = connect_in_memory().await.unwrap();

        let a = product("store-a", "200002", 10.0);
        let b = product("store-b", "200002", 99.0);
        append(&db, &build_entry(&a, 0.0, 0.0, None, "Создание товара"))
            .await
            .unwrap();
        append(&db, &build_entry(&a, 10.0, 1.0, None, "Изменение цены"))
            .await
            .unwrap();
        append(&db, &build_entry(&b, 0.0, 0.0, None, "Создание товара"))
            .await
            .unwrap();

        let resp = list(
            &db,
            PriceHistoryListRequest {
                store_id: "store-a".into(),
                upc: Some("200002".into()),
                date_from: None,
                date_to: None,
                limit: 1,
            },
        )
        .await
        .unwrap();

        assert_eq!(resp.total_count, 2);
        assert_eq!(resp.items.len(), 1);
        assert!(resp.has_more);
        assert_eq!(resp.items[0].store_id, "store-a");
    }
}
