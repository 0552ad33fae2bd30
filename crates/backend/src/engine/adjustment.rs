use contracts::domain::a002_product::Product;
use contracts::domain::a004_inventory_adjustment::{AdjustmentType, InventoryAdjustment};
use contracts::domain::common::AggregateRoot;
use contracts::engine::{AdjustmentRequest, EngineError, ReconcileRequest};
use contracts::projections::p901_audit_log::{
    ActionCode, AuditCategory, AuditEntry, AuditSeverity, FieldChange,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::json;

use crate::domain::a002_product::repository as product_repo;
use crate::domain::a004_inventory_adjustment::repository as adjustment_repo;
use crate::engine::numbering;
use crate::projections::p901_audit_log::service as audit;

/// Порог, после которого корректировка попадает в аудит как WARNING
const LARGE_ADJUSTMENT_THRESHOLD: i64 = 50;

// ============================================================================
// Delta mode
// ============================================================================

/// Скорректировать остаток на дельту.
///
/// Остаток и строка журнала корректировок записываются в одной транзакции.
/// Результат ниже нуля отклоняется целиком.
pub async fn adjust_inventory(
    db: &DatabaseConnection,
    req: AdjustmentRequest,
) -> Result<InventoryAdjustment, EngineError> {
    if req.store_id.trim().is_empty() {
        return Err(EngineError::invalid("ID магазина не может быть пустым"));
    }
    if req.upc.trim().is_empty() {
        return Err(EngineError::invalid("UPC не может быть пустым"));
    }
    if req.quantity_change == 0 {
        return Err(EngineError::invalid(
            "Изменение остатка не может быть нулевым",
        ));
    }
    if req.reason.trim().is_empty() {
        return Err(EngineError::invalid("Причина корректировки обязательна"));
    }

    let txn = db.begin().await.map_err(EngineError::persistence)?;

    let product = product_repo::find_by_upc(&txn, &req.store_id, &req.upc)
        .await
        .map_err(EngineError::persistence)?
        .ok_or_else(|| EngineError::ProductNotFound {
            store_id: req.store_id.clone(),
            upc: req.upc.clone(),
        })?;

    let before = product.inventory;
    let after = before + req.quantity_change;
    if after < 0 {
        return Err(EngineError::NegativeInventory {
            upc: req.upc.clone(),
            current: before,
            requested: req.quantity_change,
        });
    }

    product_repo::set_inventory(&txn, &req.store_id, &req.upc, after)
        .await
        .map_err(EngineError::persistence)?;

    let mut adjustment = InventoryAdjustment::new_for_insert(
        numbering::adjustment_number(),
        format!(
            "{}: {}",
            req.adjustment_type.display_name(),
            product.base.description
        ),
        req.store_id.clone(),
        product.to_string_id(),
        product.upc.clone(),
        product.base.description.clone(),
        req.adjustment_type,
        before,
        after,
        req.reason.trim().to_string(),
        req.actor_id.clone(),
        req.actor_name.clone(),
        req.related_transaction.clone(),
        req.notes.clone(),
    );
    adjustment.validate().map_err(EngineError::invalid)?;
    adjustment.before_write();

    adjustment_repo::insert(&txn, &adjustment)
        .await
        .map_err(EngineError::persistence)?;

    txn.commit().await.map_err(EngineError::persistence)?;

    append_adjustment_audits(db, &adjustment).await;
    Ok(adjustment)
}

// ============================================================================
// Absolute mode (reconcile)
// ============================================================================

/// Сверка остатка: установить фактически пересчитанное количество.
///
/// Авторитетное "было" — остаток, прочитанный внутри транзакции;
/// заявленное вызывающей стороной значение никогда его не подменяет,
/// расхождение фиксируется в примечаниях.
pub async fn reconcile(
    db: &DatabaseConnection,
    req: ReconcileRequest,
) -> Result<InventoryAdjustment, EngineError> {
    if req.store_id.trim().is_empty() {
        return Err(EngineError::invalid("ID магазина не может быть пустым"));
    }
    if req.upc.trim().is_empty() {
        return Err(EngineError::invalid("UPC не может быть пустым"));
    }
    if req.reason.trim().is_empty() {
        return Err(EngineError::invalid("Причина сверки обязательна"));
    }

    let txn = db.begin().await.map_err(EngineError::persistence)?;

    let product = product_repo::find_by_upc(&txn, &req.store_id, &req.upc)
        .await
        .map_err(EngineError::persistence)?
        .ok_or_else(|| EngineError::ProductNotFound {
            store_id: req.store_id.clone(),
            upc: req.upc.clone(),
        })?;

    let before = product.inventory;
    if req.new_count < 0 {
        return Err(EngineError::NegativeInventory {
            upc: req.upc.clone(),
            current: before,
            requested: req.new_count - before,
        });
    }

    let mut notes: Vec<String> = Vec::new();
    if let Some(claimed) = req.previous_count {
        if claimed != before {
            tracing::warn!(
                "Reconcile count mismatch for {} in store {}: claimed {}, actual {}",
                req.upc,
                req.store_id,
                claimed,
                before
            );
            notes.push(format!(
                "Заявленный остаток {} расходится с фактическим {}",
                claimed, before
            ));
        }
    }
    if let Some(extra) = &req.notes {
        if !extra.trim().is_empty() {
            notes.push(extra.trim().to_string());
        }
    }
    let comment = if notes.is_empty() {
        None
    } else {
        Some(notes.join("; "))
    };

    product_repo::set_inventory(&txn, &req.store_id, &req.upc, req.new_count)
        .await
        .map_err(EngineError::persistence)?;

    let mut adjustment = InventoryAdjustment::new_for_insert(
        numbering::adjustment_number(),
        format!(
            "{}: {}",
            AdjustmentType::Reconcile.display_name(),
            product.base.description
        ),
        req.store_id.clone(),
        product.to_string_id(),
        product.upc.clone(),
        product.base.description.clone(),
        AdjustmentType::Reconcile,
        before,
        req.new_count,
        req.reason.trim().to_string(),
        req.actor_id.clone(),
        req.actor_name.clone(),
        None,
        comment,
    );
    adjustment.validate().map_err(EngineError::invalid)?;
    adjustment.before_write();

    adjustment_repo::insert(&txn, &adjustment)
        .await
        .map_err(EngineError::persistence)?;

    txn.commit().await.map_err(EngineError::persistence)?;

    append_adjustment_audits(db, &adjustment).await;
    Ok(adjustment)
}

// ============================================================================
// Post-commit audit
// ============================================================================

async fn append_adjustment_audits(db: &DatabaseConnection, adjustment: &InventoryAdjustment) {
    let mut entry = AuditEntry::new(
        adjustment.store_id.clone(),
        ActionCode::InventoryAdjustment,
        AuditCategory::Inventory,
    );
    entry.actor_id = adjustment.actor_id.clone();
    entry.actor_name = adjustment.actor_name.clone();
    entry.set_entity(adjustment);
    entry.upc = Some(adjustment.upc.clone());
    entry.product_name = Some(adjustment.product_name.clone());
    entry.transaction_number = adjustment.related_transaction.clone();
    entry.reason = Some(adjustment.reason.clone());
    entry.severity = if adjustment.quantity_changed.abs() > LARGE_ADJUSTMENT_THRESHOLD {
        AuditSeverity::Warning
    } else {
        AuditSeverity::Info
    };
    entry.changes = vec![FieldChange {
        field: "inventory".into(),
        old_value: json!(adjustment.quantity_before),
        new_value: json!(adjustment.quantity_after),
    }];
    entry.extra = Some(json!({
        "adjustment_type": adjustment.adjustment_type.as_str(),
        "adjustment_code": adjustment.base.code,
        "quantity_changed": adjustment.quantity_changed,
    }));
    audit::append(db, entry).await;

    if adjustment.quantity_changed != 0 {
        let action = if adjustment.quantity_changed > 0 {
            ActionCode::InventoryIncrease
        } else {
            ActionCode::InventoryDecrease
        };
        let mut entry =
            AuditEntry::new(adjustment.store_id.clone(), action, AuditCategory::Inventory);
        entry.actor_id = adjustment.actor_id.clone();
        entry.actor_name = adjustment.actor_name.clone();
        entry.entity_type = Some(Product::full_name());
        entry.entity_id = Some(adjustment.product_id.clone());
        entry.upc = Some(adjustment.upc.clone());
        entry.product_name = Some(adjustment.product_name.clone());
        entry.reason = Some(adjustment.reason.clone());
        entry.changes = vec![FieldChange {
            field: "inventory".into(),
            old_value: json!(adjustment.quantity_before),
            new_value: json!(adjustment.quantity_after),
        }];
        audit::append(db, entry).await;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projections::p901_audit_log::repository as audit_repo;
    use crate::shared::data::db::connect_in_memory;
    use contracts::domain::a002_product::Product;

    async fn seed_product(db: &DatabaseConnection, store_id: &str, upc: &str, inventory: i64) {
        let product = Product::new_for_insert(
            store_id.to_string(),
            upc.to_string(),
            format!("Товар {}", upc),
            10.0,
            4.0,
            None,
            None,
            inventory,
            None,
        );
        product_repo::insert(db, &product).await.unwrap();
    }

    fn delta_request(store_id: &str, upc: &str, change: i64) -> AdjustmentRequest {
        AdjustmentRequest {
            store_id: store_id.to_string(),
            upc: upc.to_string(),
            adjustment_type: AdjustmentType::Waste,
            quantity_change: change,
            reason: "Просрочка".into(),
            actor_id: None,
            actor_name: None,
            related_transaction: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_adjustment_applies_delta() {
        let db = connect_in_memory().await.unwrap();
        seed_product(&db, "store-a", "400001", 10).await;

        let adjustment = adjust_inventory(&db, delta_request("store-a", "400001", -4))
            .await
            .unwrap();

        assert!(adjustment.base.code.starts_with("ADJ-"));
        assert_eq!(adjustment.quantity_before, 10);
        assert_eq!(adjustment.quantity_after, 6);
        assert_eq!(adjustment.quantity_changed, -4);

        let p = product_repo::find_by_upc(&db, "store-a", "400001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.inventory, 6);

        let stored = adjustment_repo::list_by_store(&db, "store-a", None, None, 10)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].adjustment_type, AdjustmentType::Waste);

        let (entries, _) = audit_repo::list_with_filters(
            &db,
            "store-a",
            None,
            Some("INVENTORY_ADJUSTMENT"),
            None,
            None,
            None,
            None,
            10,
        )
        .await
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].reason.as_deref(), Some("Просрочка"));
        assert_eq!(entries[0].severity, AuditSeverity::Info);
    }

    #[tokio::test]
    async fn test_adjustment_below_zero_blocked() {
        let db = connect_in_memory().await.unwrap();
        seed_product(&db, "store-a", "400002", 3).await;

        let err = adjust_inventory(&db, delta_request("store-a", "400002", -5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::NegativeInventory {
                current: 3,
                requested: -5,
                ..
            }
        ));

        // Ничего не записано
        let p = product_repo::find_by_upc(&db, "store-a", "400002")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.inventory, 3);
        let stored = adjustment_repo::list_by_store(&db, "store-a", None, None, 10)
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_adjustment_rejects_zero_change() {
        let db = connect_in_memory().await.unwrap();
        seed_product(&db, "store-a", "400003", 3).await;

        let err = adjust_inventory(&db, delta_request("store-a", "400003", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_adjust_unknown_product() {
        let db = connect_in_memory().await.unwrap();

        let err = adjust_inventory(&db, delta_request("store-a", "999999", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ProductNotFound { .. }));
    }

    #[tokio::test]
    async fn test_large_adjustment_flagged_as_warning() {
        let db = connect_in_memory().await.unwrap();
        seed_product(&db, "store-a", "400004", 0).await;

        let mut req = delta_request("store-a", "400004", 60);
        req.adjustment_type = AdjustmentType::Correction;
        req.reason = "Приёмка поставки".into();
        adjust_inventory(&db, req).await.unwrap();

        let (entries, _) = audit_repo::list_with_filters(
            &db,
            "store-a",
            None,
            Some("INVENTORY_ADJUSTMENT"),
            None,
            None,
            None,
            None,
            10,
        )
        .await
        .unwrap();
        assert_eq!(entries[0].severity, AuditSeverity::Warning);
    }

    #[tokio::test]
    async fn test_reconcile_records_delta() {
        let db = connect_in_memory().await.unwrap();
        seed_product(&db, "store-a", "400005", 8).await;

        let adjustment = reconcile(
            &db,
            ReconcileRequest {
                store_id: "store-a".into(),
                upc: "400005".into(),
                new_count: 5,
                previous_count: Some(8),
                reason: "Инвентаризация".into(),
                actor_id: None,
                actor_name: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(adjustment.adjustment_type, AdjustmentType::Reconcile);
        assert_eq!(adjustment.quantity_before, 8);
        assert_eq!(adjustment.quantity_after, 5);
        assert_eq!(adjustment.quantity_changed, -3);
        assert_eq!(adjustment.base.comment, None);

        let p = product_repo::find_by_upc(&db, "store-a", "400005")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.inventory, 5);
    }

    #[tokio::test]
    async fn test_reconcile_notes_count_mismatch() {
        let db = connect_in_memory().await.unwrap();
        seed_product(&db, "store-a", "400006", 10).await;

        let adjustment = reconcile(
            &db,
            ReconcileRequest {
                store_id: "store-a".into(),
                upc: "400006".into(),
                new_count: 5,
                previous_count: Some(8),
                reason: "Инвентаризация".into(),
                actor_id: None,
                actor_name: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        // В "было" идёт остаток из транзакции, а не заявленный
        assert_eq!(adjustment.quantity_before, 10);
        assert_eq!(adjustment.quantity_changed, -5);
        let comment = adjustment.base.comment.unwrap();
        assert!(comment.contains("8"));
        assert!(comment.contains("10"));
    }

    #[tokio::test]
    async fn test_reconcile_rejects_negative_target() {
        let db = connect_in_memory().await.unwrap();
        seed_product(&db, "store-a", "400007", 4).await;

        let err = reconcile(
            &db,
            ReconcileRequest {
                store_id: "store-a".into(),
                upc: "400007".into(),
                new_count: -1,
                previous_count: None,
                reason: "Инвентаризация".into(),
                actor_id: None,
                actor_name: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::NegativeInventory { .. }));

        let p = product_repo::find_by_upc(&db, "store-a", "400007")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.inventory, 4);
    }
}
