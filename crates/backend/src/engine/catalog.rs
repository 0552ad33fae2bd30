use contracts::domain::a002_product::Product;
use contracts::engine::{EngineError, ProductCreate, ProductUpdate, UpdatedProduct};
use contracts::projections::p901_audit_log::{
    ActionCode, AuditCategory, AuditEntry, AuditSeverity, FieldChange,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::json;

use crate::domain::a002_product::repository as product_repo;
use crate::projections::p900_price_history::service as price_history;
use crate::projections::p901_audit_log::service as audit;

// ============================================================================
// Create
// ============================================================================

/// Создать товар каталога.
///
/// Пара (store_id, upc) уникальна. После вставки пишется начальная
/// запись истории цен (старые значения 0) и запись аудита.
pub async fn create_product(
    db: &DatabaseConnection,
    req: ProductCreate,
) -> Result<Product, EngineError> {
    if req.inventory < 0 {
        return Err(EngineError::invalid(
            "Начальный остаток не может быть отрицательным",
        ));
    }

    let mut product = Product::new_for_insert(
        req.store_id.clone(),
        req.upc.trim().to_string(),
        req.name.trim().to_string(),
        req.price,
        req.cost,
        req.supplier_id.clone(),
        req.supplier_name.clone(),
        req.inventory,
        req.comment.clone(),
    );
    product.validate().map_err(EngineError::invalid)?;

    let existing = product_repo::find_by_upc(db, &product.store_id, &product.upc)
        .await
        .map_err(EngineError::persistence)?;
    if existing.is_some() {
        return Err(EngineError::DuplicateUpc {
            store_id: product.store_id.clone(),
            upc: product.upc.clone(),
        });
    }

    product.before_write();
    product_repo::insert(db, &product)
        .await
        .map_err(EngineError::persistence)?;

    let history =
        price_history::build_entry(&product, 0.0, 0.0, req.actor_id.clone(), "Создание товара");
    if let Err(e) = price_history::append(db, &history).await {
        tracing::error!(
            "Price history append failed for {} in store {}: {}",
            product.upc,
            product.store_id,
            e
        );
    }

    let mut entry = AuditEntry::new(
        product.store_id.clone(),
        ActionCode::ProductCreate,
        AuditCategory::Product,
    );
    entry.actor_id = req.actor_id.clone();
    entry.set_entity(&product);
    entry.upc = Some(product.upc.clone());
    entry.product_name = Some(product.base.description.clone());
    entry.extra = Some(json!({
        "price": product.price,
        "cost": product.cost,
        "inventory": product.inventory,
    }));
    audit::append(db, entry).await;

    Ok(product)
}

// ============================================================================
// Update
// ============================================================================

/// Обновить поля товара.
///
/// Движок сравнивает каждое переданное поле с текущим состоянием и
/// собирает список фактических изменений; обновление без изменений
/// ничего не пишет. История цен пополняется только при фактическом
/// изменении цены или себестоимости; сбой этой записи не отменяет
/// сохранённый товар (`price_history_recorded = false`).
pub async fn update_product(
    db: &DatabaseConnection,
    store_id: &str,
    upc: &str,
    upd: ProductUpdate,
) -> Result<UpdatedProduct, EngineError> {
    if upd.add_inventory.is_some() && upd.set_inventory.is_some() {
        return Err(EngineError::invalid(
            "add_inventory и set_inventory взаимоисключимы",
        ));
    }
    if let Some(value) = upd.set_inventory {
        if value < 0 {
            return Err(EngineError::invalid(
                "Абсолютный остаток не может быть отрицательным",
            ));
        }
    }

    let txn = db.begin().await.map_err(EngineError::persistence)?;

    let mut product = product_repo::find_by_upc(&txn, store_id, upc)
        .await
        .map_err(EngineError::persistence)?
        .ok_or_else(|| EngineError::ProductNotFound {
            store_id: store_id.to_string(),
            upc: upc.to_string(),
        })?;

    let old_price = product.price;
    let old_cost = product.cost;
    let mut changes: Vec<FieldChange> = Vec::new();

    if let Some(name) = &upd.name {
        let name = name.trim();
        if name != product.base.description {
            changes.push(FieldChange {
                field: "name".into(),
                old_value: json!(product.base.description),
                new_value: json!(name),
            });
            product.base.description = name.to_string();
        }
    }
    if let Some(price) = upd.price {
        if price != product.price {
            changes.push(FieldChange {
                field: "price".into(),
                old_value: json!(product.price),
                new_value: json!(price),
            });
            product.price = price;
        }
    }
    if let Some(cost) = upd.cost {
        if cost != product.cost {
            changes.push(FieldChange {
                field: "cost".into(),
                old_value: json!(product.cost),
                new_value: json!(cost),
            });
            product.cost = cost;
        }
    }
    if let Some(supplier_id) = &upd.supplier_id {
        if product.supplier_id.as_deref() != Some(supplier_id.as_str()) {
            changes.push(FieldChange {
                field: "supplier_id".into(),
                old_value: json!(product.supplier_id),
                new_value: json!(supplier_id),
            });
            product.supplier_id = Some(supplier_id.clone());
        }
    }
    if let Some(supplier_name) = &upd.supplier_name {
        if product.supplier_name.as_deref() != Some(supplier_name.as_str()) {
            changes.push(FieldChange {
                field: "supplier_name".into(),
                old_value: json!(product.supplier_name),
                new_value: json!(supplier_name),
            });
            product.supplier_name = Some(supplier_name.clone());
        }
    }
    if let Some(delta) = upd.add_inventory {
        let after = product.inventory + delta;
        if after < 0 {
            return Err(EngineError::NegativeInventory {
                upc: upc.to_string(),
                current: product.inventory,
                requested: delta,
            });
        }
        if delta != 0 {
            changes.push(FieldChange {
                field: "inventory".into(),
                old_value: json!(product.inventory),
                new_value: json!(after),
            });
            product.inventory = after;
        }
    }
    if let Some(value) = upd.set_inventory {
        if value != product.inventory {
            changes.push(FieldChange {
                field: "inventory".into(),
                old_value: json!(product.inventory),
                new_value: json!(value),
            });
            product.inventory = value;
        }
    }

    if changes.is_empty() {
        txn.commit().await.map_err(EngineError::persistence)?;
        return Ok(UpdatedProduct {
            product,
            changes,
            price_history_recorded: true,
        });
    }

    product.validate().map_err(EngineError::invalid)?;
    product.base.metadata.increment_version();
    product.before_write();
    product_repo::update(&txn, &product)
        .await
        .map_err(EngineError::persistence)?;
    txn.commit().await.map_err(EngineError::persistence)?;

    let price_changed = product.price != old_price || product.cost != old_cost;
    let mut price_history_recorded = true;

    if price_changed {
        let history = price_history::build_entry(
            &product,
            old_price,
            old_cost,
            upd.actor_id.clone(),
            "Изменение цены",
        );
        if let Err(e) = price_history::append(db, &history).await {
            price_history_recorded = false;
            tracing::error!(
                "Price history append failed for {} in store {}: {}",
                product.upc,
                product.store_id,
                e
            );
        }

        let mut entry = AuditEntry::new(
            product.store_id.clone(),
            ActionCode::PriceChange,
            AuditCategory::PriceChange,
        );
        entry.actor_id = upd.actor_id.clone();
        entry.set_entity(&product);
        entry.upc = Some(product.upc.clone());
        entry.product_name = Some(product.base.description.clone());
        entry.changes = changes
            .iter()
            .filter(|c| c.field == "price" || c.field == "cost")
            .cloned()
            .collect();
        if !price_history_recorded {
            entry.severity = AuditSeverity::Error;
            entry.success = false;
            entry.error_message = Some("price history append failed".into());
        }
        audit::append(db, entry).await;
    }

    let has_other_changes = changes
        .iter()
        .any(|c| c.field != "price" && c.field != "cost");
    if has_other_changes {
        let mut entry = AuditEntry::new(
            product.store_id.clone(),
            ActionCode::ProductUpdate,
            AuditCategory::Product,
        );
        entry.actor_id = upd.actor_id.clone();
        entry.set_entity(&product);
        entry.upc = Some(product.upc.clone());
        entry.product_name = Some(product.base.description.clone());
        entry.changes = changes.clone();
        audit::append(db, entry).await;
    }

    Ok(UpdatedProduct {
        product,
        changes,
        price_history_recorded,
    })
}

// ============================================================================
// Deactivate / purge
// ============================================================================

/// Снять товар с продажи (мягкое удаление)
pub async fn deactivate(
    db: &DatabaseConnection,
    store_id: &str,
    upc: &str,
) -> Result<(), EngineError> {
    let product = product_repo::find_by_upc(db, store_id, upc)
        .await
        .map_err(EngineError::persistence)?
        .ok_or_else(|| EngineError::ProductNotFound {
            store_id: store_id.to_string(),
            upc: upc.to_string(),
        })?;

    product_repo::set_inactive(db, store_id, upc)
        .await
        .map_err(EngineError::persistence)?;

    let mut entry = AuditEntry::new(
        store_id.to_string(),
        ActionCode::ProductDeactivate,
        AuditCategory::Product,
    );
    entry.set_entity(&product);
    entry.upc = Some(product.upc.clone());
    entry.product_name = Some(product.base.description.clone());
    audit::append(db, entry).await;

    Ok(())
}

/// Физически удалить запись товара (административная операция
/// для некорректно заведённых UPC)
pub async fn purge_invalid_upc(
    db: &DatabaseConnection,
    store_id: &str,
    upc: &str,
) -> Result<(), EngineError> {
    let product = product_repo::find_by_upc(db, store_id, upc)
        .await
        .map_err(EngineError::persistence)?
        .ok_or_else(|| EngineError::ProductNotFound {
            store_id: store_id.to_string(),
            upc: upc.to_string(),
        })?;

    product_repo::hard_delete(db, store_id, upc)
        .await
        .map_err(EngineError::persistence)?;

    let mut entry = AuditEntry::new(
        store_id.to_string(),
        ActionCode::ProductPurge,
        AuditCategory::Product,
    );
    entry.set_entity(&product);
    entry.upc = Some(product.upc.clone());
    entry.product_name = Some(product.base.description.clone());
    entry.extra = Some(json!({
        "price": product.price,
        "inventory": product.inventory,
    }));
    audit::append(db, entry).await;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projections::p900_price_history::repository as history_repo;
    use crate::projections::p901_audit_log::repository as audit_repo;
    use crate::shared::data::db::connect_in_memory;

    fn create_request(store_id: &str, upc: &str, price: f64) -> ProductCreate {
        ProductCreate {
            store_id: store_id.to_string(),
            upc: upc.to_string(),
            name: format!("Товар {}", upc),
            price,
            cost: 2.0,
            supplier_id: None,
            supplier_name: None,
            inventory: 10,
            actor_id: None,
            comment: None,
        }
    }

    async fn audit_count(db: &DatabaseConnection, store_id: &str, action: &str) -> i32 {
        let (_, total) = audit_repo::list_with_filters(
            db,
            store_id,
            None,
            Some(action),
            None,
            None,
            None,
            None,
            100,
        )
        .await
        .unwrap();
        total
    }

    #[tokio::test]
    async fn test_create_product_writes_initial_price_history() {
        let db = connect_in_memory().await.unwrap();

        let product = create_product(&db, create_request("store-a", "500001", 4.99))
            .await
            .unwrap();
        assert_eq!(product.base.code, "500001");
        assert!(product.is_active);

        let (entries, total) =
            history_repo::list_with_filters(&db, "store-a", Some("500001"), None, None, 10)
                .await
                .unwrap();
        assert_eq!(total, 1);
        assert_eq!(entries[0].old_price, 0.0);
        assert_eq!(entries[0].new_price, 4.99);
        assert_eq!(entries[0].price_change_percent, None);

        assert_eq!(audit_count(&db, "store-a", "PRODUCT_CREATE").await, 1);
    }

    #[tokio::test]
    async fn test_create_duplicate_upc_rejected_per_store() {
        let db = connect_in_memory().await.unwrap();

        create_product(&db, create_request("store-a", "500002", 1.0))
            .await
            .unwrap();

        let err = create_product(&db, create_request("store-a", "500002", 2.0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateUpc { .. }));

        // Тот же UPC в другом магазине — независимый товар
        create_product(&db, create_request("store-b", "500002", 9.0))
            .await
            .unwrap();
        let b = product_repo::find_by_upc(&db, "store-b", "500002")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(b.price, 9.0);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_fields() {
        let db = connect_in_memory().await.unwrap();

        let mut bad_name = create_request("store-a", "500003", 1.0);
        bad_name.name = "  ".into();
        assert!(matches!(
            create_product(&db, bad_name).await.unwrap_err(),
            EngineError::InvalidRequest(_)
        ));

        let mut bad_price = create_request("store-a", "500003", -1.0);
        bad_price.price = -1.0;
        assert!(matches!(
            create_product(&db, bad_price).await.unwrap_err(),
            EngineError::InvalidRequest(_)
        ));

        let mut bad_inventory = create_request("store-a", "500003", 1.0);
        bad_inventory.inventory = -5;
        assert!(matches!(
            create_product(&db, bad_inventory).await.unwrap_err(),
            EngineError::InvalidRequest(_)
        ));
    }

    #[tokio::test]
    async fn test_price_change_appends_history() {
        let db = connect_in_memory().await.unwrap();
        create_product(&db, create_request("store-a", "500004", 4.99))
            .await
            .unwrap();

        let updated = update_product(
            &db,
            "store-a",
            "500004",
            ProductUpdate {
                price: Some(5.99),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(updated.price_history_recorded);
        assert_eq!(updated.changes.len(), 1);
        assert_eq!(updated.changes[0].field, "price");
        assert_eq!(updated.product.price, 5.99);
        assert_eq!(updated.product.base.metadata.version, 1);

        let (entries, total) =
            history_repo::list_with_filters(&db, "store-a", Some("500004"), None, None, 10)
                .await
                .unwrap();
        assert_eq!(total, 2);
        let newest = entries
            .iter()
            .find(|e| e.old_price > 0.0)
            .expect("запись об изменении цены");
        assert_eq!(newest.old_price, 4.99);
        assert_eq!(newest.new_price, 5.99);
        let percent = newest.price_change_percent.unwrap();
        assert!((percent - 20.04).abs() < 0.01);

        assert_eq!(audit_count(&db, "store-a", "PRICE_CHANGE").await, 1);
    }

    #[tokio::test]
    async fn test_name_only_update_skips_price_history() {
        let db = connect_in_memory().await.unwrap();
        create_product(&db, create_request("store-a", "500005", 3.0))
            .await
            .unwrap();

        let updated = update_product(
            &db,
            "store-a",
            "500005",
            ProductUpdate {
                name: Some("Новое название".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.changes.len(), 1);
        assert_eq!(updated.changes[0].field, "name");
        assert!(updated.price_history_recorded);

        let (_, history_total) =
            history_repo::list_with_filters(&db, "store-a", Some("500005"), None, None, 10)
                .await
                .unwrap();
        assert_eq!(history_total, 1);

        assert_eq!(audit_count(&db, "store-a", "PRODUCT_UPDATE").await, 1);
        assert_eq!(audit_count(&db, "store-a", "PRICE_CHANGE").await, 0);
    }

    #[tokio::test]
    async fn test_noop_update_writes_nothing() {
        let db = connect_in_memory().await.unwrap();
        let created = create_product(&db, create_request("store-a", "500006", 3.0))
            .await
            .unwrap();

        let updated = update_product(
            &db,
            "store-a",
            "500006",
            ProductUpdate {
                name: Some(created.base.description.clone()),
                price: Some(3.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(updated.changes.is_empty());
        assert!(updated.price_history_recorded);

        let current = product_repo::find_by_upc(&db, "store-a", "500006")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            current.base.metadata.version,
            created.base.metadata.version
        );
        assert_eq!(audit_count(&db, "store-a", "PRODUCT_UPDATE").await, 0);
    }

    #[tokio::test]
    async fn test_update_inventory_modes() {
        let db = connect_in_memory().await.unwrap();
        create_product(&db, create_request("store-a", "500007", 3.0))
            .await
            .unwrap();

        let updated = update_product(
            &db,
            "store-a",
            "500007",
            ProductUpdate {
                add_inventory: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.product.inventory, 15);

        let err = update_product(
            &db,
            "store-a",
            "500007",
            ProductUpdate {
                add_inventory: Some(-100),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::NegativeInventory { .. }));

        let err = update_product(
            &db,
            "store-a",
            "500007",
            ProductUpdate {
                set_inventory: Some(-1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(_)));

        let err = update_product(
            &db,
            "store-a",
            "500007",
            ProductUpdate {
                add_inventory: Some(1),
                set_inventory: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(_)));

        // Неудачные попытки ничего не изменили
        let current = product_repo::find_by_upc(&db, "store-a", "500007")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.inventory, 15);
    }

    #[tokio::test]
    async fn test_update_unknown_product() {
        let db = connect_in_memory().await.unwrap();

        let err = update_product(
            &db,
            "store-a",
            "999999",
            ProductUpdate {
                price: Some(1.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::ProductNotFound { .. }));
    }

    #[tokio::test]
    async fn test_deactivate_then_purge() {
        let db = connect_in_memory().await.unwrap();
        create_product(&db, create_request("store-a", "500008", 3.0))
            .await
            .unwrap();

        deactivate(&db, "store-a", "500008").await.unwrap();
        let product = product_repo::find_by_upc(&db, "store-a", "500008")
            .await
            .unwrap()
            .unwrap();
        assert!(!product.is_active);
        assert_eq!(audit_count(&db, "store-a", "PRODUCT_DEACTIVATE").await, 1);

        purge_invalid_upc(&db, "store-a", "500008").await.unwrap();
        let gone = product_repo::find_by_upc(&db, "store-a", "500008")
            .await
            .unwrap();
        assert!(gone.is_none());
        assert_eq!(audit_count(&db, "store-a", "PRODUCT_PURGE").await, 1);

        let err = deactivate(&db, "store-a", "500008").await.unwrap_err();
        assert!(matches!(err, EngineError::ProductNotFound { .. }));
    }
}
