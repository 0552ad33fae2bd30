use std::collections::BTreeMap;

use contracts::domain::a002_product::Product;
use contracts::domain::a003_sale_transaction::{PaymentMethod, SaleLine, SaleTransaction};
use contracts::domain::common::AggregateRoot;
use contracts::engine::{
    is_off_catalog_upc, EngineError, InventoryWarning, SaleOutcome, SaleRequest,
};
use contracts::projections::p901_audit_log::{
    ActionCode, AuditCategory, AuditEntry, AuditSeverity, FieldChange,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::json;

use crate::domain::a002_product::repository as product_repo;
use crate::domain::a003_sale_transaction::repository as sale_repo;
use crate::engine::numbering;
use crate::projections::p901_audit_log::service as audit;
use crate::shared::format::format_money;

// ============================================================================
// Public API
// ============================================================================

/// Провести продажу.
///
/// Внутри одной транзакции: снимок цены/себестоимости по каждой строке,
/// списание остатков и запись чека. Недостаток остатка не блокирует
/// продажу — остаток уходит в минус, строка получает предупреждение.
/// Повтор с тем же ключом идемпотентности возвращает уже записанный чек.
pub async fn record_sale(
    db: &DatabaseConnection,
    req: SaleRequest,
) -> Result<SaleOutcome, EngineError> {
    validate_request(&req)?;

    match run_unit(db, &req).await {
        Ok(UnitOutcome::Replay(transaction)) => {
            tracing::info!(
                "Sale replayed by idempotency key: {} (store {})",
                transaction.transaction_number(),
                transaction.store_id
            );
            Ok(SaleOutcome {
                transaction,
                warnings: Vec::new(),
                idempotent_replay: true,
            })
        }
        Ok(UnitOutcome::Committed {
            transaction,
            warnings,
            deltas,
        }) => {
            append_sale_audits(db, &transaction, &warnings, &deltas).await;
            Ok(SaleOutcome {
                transaction,
                warnings,
                idempotent_replay: false,
            })
        }
        Err(err) => {
            append_failure_audit(db, &req, &err).await;
            Err(err)
        }
    }
}

// ============================================================================
// Atomic unit
// ============================================================================

enum UnitOutcome {
    /// Чек с этим ключом идемпотентности уже записан
    Replay(SaleTransaction),
    Committed {
        transaction: SaleTransaction,
        warnings: Vec<InventoryWarning>,
        deltas: Vec<ProductDelta>,
    },
}

/// Суммарное изменение остатка одного товара каталога в рамках чека
struct ProductDelta {
    upc: String,
    product_id: String,
    product_name: String,
    before: i64,
    after: i64,
    net: i64,
}

struct TouchedProduct {
    product_id: String,
    product_name: String,
    first_read_inventory: i64,
    net_delta: i64,
}

async fn run_unit(db: &DatabaseConnection, req: &SaleRequest) -> Result<UnitOutcome, EngineError> {
    let txn = db.begin().await.map_err(EngineError::persistence)?;

    if let Some(key) = normalized_idempotency_key(req) {
        let existing = sale_repo::find_by_idempotency_key(&txn, &req.store_id, key)
            .await
            .map_err(EngineError::persistence)?;
        if let Some(transaction) = existing {
            txn.commit().await.map_err(EngineError::persistence)?;
            return Ok(UnitOutcome::Replay(transaction));
        }
    }

    let mut lines: Vec<SaleLine> = Vec::with_capacity(req.items.len());
    let mut warnings: Vec<InventoryWarning> = Vec::new();
    let mut touched: BTreeMap<String, TouchedProduct> = BTreeMap::new();

    for item in &req.items {
        // Внекаталожные позиции оцениваются из запроса и не трогают каталог
        if is_off_catalog_upc(&item.upc) {
            let price = item.price.ok_or_else(|| {
                EngineError::invalid(format!(
                    "Для внекаталожной позиции {} требуется цена",
                    item.upc
                ))
            })?;
            let name = item.name.clone().unwrap_or_else(|| item.upc.clone());
            lines.push(SaleLine {
                product_id: None,
                upc: item.upc.clone(),
                name,
                price_at_sale: price,
                cost_at_sale: 0.0,
                quantity: item.quantity,
                line_subtotal: price * item.quantity as f64,
            });
            continue;
        }

        let product = product_repo::find_by_upc(&txn, &req.store_id, &item.upc)
            .await
            .map_err(EngineError::persistence)?
            .ok_or_else(|| EngineError::ProductNotFound {
                store_id: req.store_id.clone(),
                upc: item.upc.clone(),
            })?;

        let available = product.inventory;
        if item.quantity > 0 && item.quantity > available {
            warnings.push(InventoryWarning {
                upc: product.upc.clone(),
                product_name: product.base.description.clone(),
                requested: item.quantity,
                available,
            });
        }

        lines.push(SaleLine {
            product_id: Some(product.to_string_id()),
            upc: product.upc.clone(),
            name: product.base.description.clone(),
            price_at_sale: product.price,
            cost_at_sale: product.cost,
            quantity: item.quantity,
            line_subtotal: product.price * item.quantity as f64,
        });

        // Списание полного количества, без отсечки по нулю
        product_repo::apply_inventory_delta(&txn, &req.store_id, &item.upc, -item.quantity)
            .await
            .map_err(EngineError::persistence)?;

        let entry = touched
            .entry(product.upc.clone())
            .or_insert_with(|| TouchedProduct {
                product_id: product.to_string_id(),
                product_name: product.base.description.clone(),
                first_read_inventory: available,
                net_delta: 0,
            });
        entry.net_delta -= item.quantity;
    }

    let subtotal: f64 = lines.iter().map(|line| line.line_subtotal).sum();
    let total = subtotal + req.tax;
    let cash_given = if req.payment_method == PaymentMethod::Cash {
        req.cash_given
    } else {
        None
    };
    let change_given = cash_given.map(|cash| cash - total);

    let number = numbering::transaction_number();
    let description = format!(
        "Чек {} на сумму {} ({})",
        number,
        format_money(total),
        req.payment_method.display_name()
    );

    let mut transaction = SaleTransaction::new_for_insert(
        number,
        description,
        req.store_id.clone(),
        lines,
        subtotal,
        req.tax,
        total,
        req.payment_method,
        cash_given,
        change_given,
        normalized_idempotency_key(req).map(str::to_string),
        req.actor_id.clone(),
        None,
    );

    transaction.validate().map_err(EngineError::invalid)?;
    transaction.before_write();

    sale_repo::insert(&txn, &transaction)
        .await
        .map_err(EngineError::persistence)?;

    txn.commit().await.map_err(EngineError::persistence)?;

    let deltas = touched
        .into_iter()
        .filter(|(_, t)| t.net_delta != 0)
        .map(|(upc, t)| ProductDelta {
            upc,
            product_id: t.product_id,
            product_name: t.product_name,
            before: t.first_read_inventory,
            after: t.first_read_inventory + t.net_delta,
            net: t.net_delta,
        })
        .collect();

    Ok(UnitOutcome::Committed {
        transaction,
        warnings,
        deltas,
    })
}

// ============================================================================
// Validation
// ============================================================================

fn validate_request(req: &SaleRequest) -> Result<(), EngineError> {
    if req.store_id.trim().is_empty() {
        return Err(EngineError::invalid("ID магазина не может быть пустым"));
    }
    if req.items.is_empty() {
        return Err(EngineError::invalid("Чек не может быть пустым"));
    }
    for item in &req.items {
        if item.upc.trim().is_empty() {
            return Err(EngineError::invalid("UPC строки не может быть пустым"));
        }
        if item.quantity == 0 {
            return Err(EngineError::invalid(
                "Количество в строке не может быть нулевым",
            ));
        }
        if is_off_catalog_upc(&item.upc) && item.price.is_none() {
            return Err(EngineError::invalid(format!(
                "Для внекаталожной позиции {} требуется цена",
                item.upc
            )));
        }
    }
    if req.payment_method == PaymentMethod::Cash && req.cash_given.is_none() {
        return Err(EngineError::invalid(
            "Для оплаты наличными требуется сумма внесённых наличных",
        ));
    }
    Ok(())
}

fn normalized_idempotency_key(req: &SaleRequest) -> Option<&str> {
    req.idempotency_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
}

// ============================================================================
// Post-commit audit
// ============================================================================

async fn append_sale_audits(
    db: &DatabaseConnection,
    transaction: &SaleTransaction,
    warnings: &[InventoryWarning],
    deltas: &[ProductDelta],
) {
    let mut entry = AuditEntry::new(
        transaction.store_id.clone(),
        ActionCode::TransactionCreate,
        AuditCategory::Transaction,
    );
    entry.actor_id = transaction.actor_id.clone();
    entry.set_entity(transaction);
    entry.transaction_number = Some(transaction.transaction_number().to_string());
    entry.severity = if warnings.is_empty() {
        AuditSeverity::Info
    } else {
        AuditSeverity::Warning
    };
    entry.extra = Some(json!({
        "subtotal": transaction.subtotal,
        "tax": transaction.tax,
        "total": transaction.total,
        "payment_method": transaction.payment_method.as_str(),
        "line_count": transaction.lines.len(),
        "warning_count": warnings.len(),
    }));
    audit::append(db, entry).await;

    for delta in deltas {
        let action = if delta.net > 0 {
            ActionCode::InventoryIncrease
        } else {
            ActionCode::InventoryDecrease
        };
        let mut entry = AuditEntry::new(
            transaction.store_id.clone(),
            action,
            AuditCategory::Inventory,
        );
        entry.actor_id = transaction.actor_id.clone();
        entry.entity_type = Some(Product::full_name());
        entry.entity_id = Some(delta.product_id.clone());
        entry.upc = Some(delta.upc.clone());
        entry.product_name = Some(delta.product_name.clone());
        entry.transaction_number = Some(transaction.transaction_number().to_string());
        entry.changes = vec![FieldChange {
            field: "inventory".into(),
            old_value: json!(delta.before),
            new_value: json!(delta.after),
        }];
        audit::append(db, entry).await;
    }
}

async fn append_failure_audit(db: &DatabaseConnection, req: &SaleRequest, err: &EngineError) {
    let mut entry = AuditEntry::new(
        req.store_id.clone(),
        ActionCode::TransactionCreateFailed,
        AuditCategory::Transaction,
    );
    entry.actor_id = req.actor_id.clone();
    entry.severity = AuditSeverity::Error;
    entry.success = false;
    entry.error_message = Some(err.to_string());
    entry.extra = Some(json!({
        "line_count": req.items.len(),
        "payment_method": req.payment_method.as_str(),
    }));
    audit::append(db, entry).await;
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
    use contracts::engine::SaleLineRequest;

    async fn seed_product(
        db: &DatabaseConnection,
        store_id: &str,
        upc: &str,
        price: f64,
        inventory: i64,
    ) {
        let product = Product::new_for_insert(
            store_id.to_string(),
            upc.to_string(),
            format!("Товар {}", upc),
            price,
            price / 2.0,
            None,
            None,
            inventory,
            None,
        );
        product_repo::insert(db, &product).await.unwrap();
    }

    fn line(upc: &str, quantity: i64) -> SaleLineRequest {
        SaleLineRequest {
            upc: upc.to_string(),
            quantity,
            name: None,
            price: None,
        }
    }

    fn request(store_id: &str, items: Vec<SaleLineRequest>) -> SaleRequest {
        SaleRequest {
            store_id: store_id.to_string(),
            items,
            tax: 0.0,
            payment_method: PaymentMethod::Card,
            cash_given: None,
            idempotency_key: None,
            actor_id: None,
        }
    }

    #[tokio::test]
    async fn test_sale_snapshots_prices_and_decrements_inventory() {
        let db = connect_in_memory().await.unwrap();
        seed_product(&db, "store-a", "100001", 10.0, 8).await;
        seed_product(&db, "store-a", "100002", 5.0, 4).await;

        let outcome = record_sale(
            &db,
            request("store-a", vec![line("100001", 2), line("100002", 1)]),
        )
        .await
        .unwrap();

        assert!(!outcome.idempotent_replay);
        assert!(outcome.warnings.is_empty());
        let t = &outcome.transaction;
        assert!(t.transaction_number().starts_with("TXN-"));
        assert_eq!(t.subtotal, 25.0);
        assert_eq!(t.total, 25.0);
        assert_eq!(t.lines.len(), 2);

        let p1 = product_repo::find_by_upc(&db, "store-a", "100001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p1.inventory, 6);
        let p2 = product_repo::find_by_upc(&db, "store-a", "100002")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p2.inventory, 3);

        let stored = sale_repo::find_by_number(&db, t.transaction_number())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.lines.len(), 2);
        assert_eq!(stored.lines[0].price_at_sale, 10.0);
    }

    #[tokio::test]
    async fn test_unknown_product_aborts_whole_sale() {
        let db = connect_in_memory().await.unwrap();
        seed_product(&db, "store-a", "100010", 10.0, 10).await;

        let err = record_sale(
            &db,
            request("store-a", vec![line("100010", 2), line("999999", 1)]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::ProductNotFound { .. }));

        // Остаток первой строки не изменился, чек не записан
        let p = product_repo::find_by_upc(&db, "store-a", "100010")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.inventory, 10);
        assert_eq!(sale_repo::count_by_store(&db, "store-a").await.unwrap(), 0);

        let (failures, total) = audit_repo::list_with_filters(
            &db,
            "store-a",
            None,
            Some("TRANSACTION_CREATE_FAILED"),
            None,
            None,
            None,
            None,
            10,
        )
        .await
        .unwrap();
        assert_eq!(total, 1);
        assert!(!failures[0].success);
        assert!(failures[0].error_message.is_some());
    }

    #[tokio::test]
    async fn test_oversell_goes_negative_with_warning() {
        let db = connect_in_memory().await.unwrap();
        seed_product(&db, "store-a", "100020", 3.0, 2).await;

        let outcome = record_sale(&db, request("store-a", vec![line("100020", 5)]))
            .await
            .unwrap();

        assert_eq!(outcome.warnings.len(), 1);
        let warning = &outcome.warnings[0];
        assert_eq!(warning.upc, "100020");
        assert_eq!(warning.requested, 5);
        assert_eq!(warning.available, 2);

        let p = product_repo::find_by_upc(&db, "store-a", "100020")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.inventory, -3);

        // Чек с нехваткой остатка фиксируется с повышенной серьёзностью
        let (entries, _) = audit_repo::list_with_filters(
            &db,
            "store-a",
            None,
            Some("TRANSACTION_CREATE"),
            None,
            None,
            None,
            None,
            10,
        )
        .await
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, AuditSeverity::Warning);
    }

    #[tokio::test]
    async fn test_price_at_sale_survives_catalog_change() {
        let db = connect_in_memory().await.unwrap();
        seed_product(&db, "store-a", "100030", 10.0, 5).await;

        let outcome = record_sale(&db, request("store-a", vec![line("100030", 1)]))
            .await
            .unwrap();
        let number = outcome.transaction.transaction_number().to_string();

        let mut product = product_repo::find_by_upc(&db, "store-a", "100030")
            .await
            .unwrap()
            .unwrap();
        product.price = 99.0;
        product.before_write();
        product_repo::update(&db, &product).await.unwrap();

        let stored = sale_repo::find_by_number(&db, &number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.lines[0].price_at_sale, 10.0);
        assert_eq!(stored.subtotal, 10.0);
    }

    #[tokio::test]
    async fn test_idempotency_key_replays_committed_sale() {
        let db = connect_in_memory().await.unwrap();
        seed_product(&db, "store-a", "100040", 2.0, 5).await;

        let mut req = request("store-a", vec![line("100040", 1)]);
        req.idempotency_key = Some("pos-7-000123".into());

        let first = record_sale(&db, req.clone()).await.unwrap();
        assert!(!first.idempotent_replay);

        let second = record_sale(&db, req).await.unwrap();
        assert!(second.idempotent_replay);
        assert_eq!(
            second.transaction.to_string_id(),
            first.transaction.to_string_id()
        );

        // Ровно один чек, остаток списан один раз
        assert_eq!(sale_repo::count_by_store(&db, "store-a").await.unwrap(), 1);
        let p = product_repo::find_by_upc(&db, "store-a", "100040")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.inventory, 4);
    }

    #[tokio::test]
    async fn test_cash_payment_computes_change() {
        let db = connect_in_memory().await.unwrap();
        seed_product(&db, "store-a", "100050", 7.5, 5).await;

        let mut req = request("store-a", vec![line("100050", 2)]);
        req.payment_method = PaymentMethod::Cash;
        req.cash_given = Some(20.0);

        let outcome = record_sale(&db, req).await.unwrap();
        assert_eq!(outcome.transaction.total, 15.0);
        assert_eq!(outcome.transaction.cash_given, Some(20.0));
        assert_eq!(outcome.transaction.change_given, Some(5.0));
    }

    #[tokio::test]
    async fn test_cash_without_cash_given_rejected() {
        let db = connect_in_memory().await.unwrap();
        seed_product(&db, "store-a", "100060", 1.0, 5).await;

        let mut req = request("store-a", vec![line("100060", 1)]);
        req.payment_method = PaymentMethod::Cash;

        let err = record_sale(&db, req).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(_)));

        // Отклонено до обращения к хранилищу
        let p = product_repo::find_by_upc(&db, "store-a", "100060")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.inventory, 5);
    }

    #[tokio::test]
    async fn test_off_catalog_line_priced_from_request() {
        let db = connect_in_memory().await.unwrap();

        let items = vec![SaleLineRequest {
            upc: "MENU-100".into(),
            quantity: 2,
            name: Some("Кофе американо".into()),
            price: Some(3.0),
        }];
        let outcome = record_sale(&db, request("store-a", items)).await.unwrap();

        let line = &outcome.transaction.lines[0];
        assert_eq!(line.product_id, None);
        assert_eq!(line.name, "Кофе американо");
        assert_eq!(line.line_subtotal, 6.0);
        assert!(outcome.warnings.is_empty());

        // Без цены внекаталожная строка не принимается
        let bad = vec![SaleLineRequest {
            upc: "MANUAL-1".into(),
            quantity: 1,
            name: None,
            price: None,
        }];
        let err = record_sale(&db, request("store-a", bad)).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_return_line_restocks_inventory() {
        let db = connect_in_memory().await.unwrap();
        seed_product(&db, "store-a", "100070", 4.0, 2).await;

        let outcome = record_sale(&db, request("store-a", vec![line("100070", -3)]))
            .await
            .unwrap();
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.transaction.subtotal, -12.0);

        let p = product_repo::find_by_upc(&db, "store-a", "100070")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.inventory, 5);

        // Возврат даёт запись о приросте остатка
        let (entries, _) = audit_repo::list_with_filters(
            &db,
            "store-a",
            None,
            Some("INVENTORY_INCREASE"),
            None,
            None,
            None,
            None,
            10,
        )
        .await
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].upc.as_deref(), Some("100070"));
    }
}
