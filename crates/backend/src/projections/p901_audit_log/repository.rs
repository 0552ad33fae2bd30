use anyhow::Result;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use contracts::projections::p901_audit_log::{
    ActionCode, AuditCategory, AuditEntry, AuditSeverity, FieldChange,
};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

// Журнал только пополняется: операций изменения и удаления здесь нет,
// UPDATE/DELETE дополнительно отклоняются триггерами хранилища.

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "p901_audit_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    // Dimensions
    pub store_id: String,
    pub actor_id: Option<String>,
    pub actor_name: Option<String>,
    pub action: String,
    pub category: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,

    // Changes
    pub changes_json: String,

    // Metadata
    pub upc: Option<String>,
    pub product_name: Option<String>,
    pub transaction_number: Option<String>,
    pub reason: Option<String>,
    pub extra_json: Option<String>,

    // Status
    pub severity: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AuditEntry {
    fn from(m: Model) -> Self {
        let action = ActionCode::from_code(&m.action)
            .unwrap_or_else(|| panic!("Unknown audit action for entry {}: {}", m.id, m.action));
        let category = AuditCategory::from_code(&m.category)
            .unwrap_or_else(|| panic!("Unknown audit category for entry {}: {}", m.id, m.category));
        let severity = AuditSeverity::from_code(&m.severity)
            .unwrap_or_else(|| panic!("Unknown audit severity for entry {}: {}", m.id, m.severity));
        let changes: Vec<FieldChange> = serde_json::from_str(&m.changes_json)
            .unwrap_or_else(|_| panic!("Failed to deserialize changes_json for entry: {}", m.id));
        let extra = m
            .extra_json
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok());

        AuditEntry {
            id: m.id,
            store_id: m.store_id,
            actor_id: m.actor_id,
            actor_name: m.actor_name,
            action,
            category,
            entity_type: m.entity_type,
            entity_id: m.entity_id,
            changes,
            upc: m.upc,
            product_name: m.product_name,
            transaction_number: m.transaction_number,
            reason: m.reason,
            extra,
            severity,
            success: m.success,
            error_message: m.error_message,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

pub async fn insert<C: ConnectionTrait>(db: &C, entry: &AuditEntry) -> Result<()> {
    let changes_json = serde_json::to_string(&entry.changes)?;
    let extra_json = entry
        .extra
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    let active = ActiveModel {
        id: Set(entry.id.clone()),
        store_id: Set(entry.store_id.clone()),
        actor_id: Set(entry.actor_id.clone()),
        actor_name: Set(entry.actor_name.clone()),
        action: Set(entry.action.as_str().to_string()),
        category: Set(entry.category.as_str().to_string()),
        entity_type: Set(entry.entity_type.clone()),
        entity_id: Set(entry.entity_id.clone()),
        changes_json: Set(changes_json),
        upc: Set(entry.upc.clone()),
        product_name: Set(entry.product_name.clone()),
        transaction_number: Set(entry.transaction_number.clone()),
        reason: Set(entry.reason.clone()),
        extra_json: Set(extra_json),
        severity: Set(entry.severity.as_str().to_string()),
        success: Set(entry.success),
        error_message: Set(entry.error_message.clone()),
        created_at: Set(Some(entry.created_at)),
    };
    active.insert(db).await?;
    Ok(())
}

/// Получить журнал аудита с фильтрами (новые сверху) и общее число записей
#[allow(clippy::too_many_arguments)]
pub async fn list_with_filters<C: ConnectionTrait>(
    db: &C,
    store_id: &str,
    category: Option<&str>,
    action: Option<&str>,
    upc: Option<&str>,
    transaction_number: Option<&str>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    limit: u64,
) -> Result<(Vec<AuditEntry>, i32)> {
    let mut query = Entity::find().filter(Column::StoreId.eq(store_id));

    if let Some(c) = category {
        query = query.filter(Column::Category.eq(c));
    }
    if let Some(a) = action {
        query = query.filter(Column::Action.eq(a));
    }
    if let Some(u) = upc {
        query = query.filter(Column::Upc.eq(u));
    }
    if let Some(number) = transaction_number {
        query = query.filter(Column::TransactionNumber.eq(number));
    }
    if let Some(from) = date_from {
        let start = Utc.from_utc_datetime(&from.and_time(NaiveTime::MIN));
        query = query.filter(Column::CreatedAt.gte(start));
    }
    if let Some(to) = date_to {
        if let Some(next) = to.succ_opt() {
            let end = Utc.from_utc_datetime(&next.and_time(NaiveTime::MIN));
            query = query.filter(Column::CreatedAt.lt(end));
        }
    }

    // Count total
    let total = query.clone().count(db).await? as i32;

    let items = query
        .order_by_desc(Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok((items, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use sea_orm::{DatabaseBackend, Statement};

    #[tokio::test]
    async fn test_storage_rejects_update_and_delete() {
        let db = connect_in_memory().await.unwrap();

        let entry = AuditEntry::new(
            "store-a",
            ActionCode::ProductCreate,
            AuditCategory::Product,
        );
        insert(&db, &entry).await.unwrap();

        let update = db
            .execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                format!(
                    "UPDATE p901_audit_log SET reason = 'tampered' WHERE id = '{}';",
                    entry.id
                ),
            ))
            .await;
        assert!(update.is_err());

        let delete = db
            .execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                format!("DELETE FROM p901_audit_log WHERE id = '{}';", entry.id),
            ))
            .await;
        assert!(delete.is_err());

        // Запись на месте и не изменена
        let (items, total) =
            list_with_filters(&db, "store-a", None, None, None, None, None, None, 10)
                .await
                .unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].id, entry.id);
        assert_eq!(items[0].reason, None);
    }

    #[tokio::test]
    async fn test_list_filters_by_action_and_category() {
        let db = connect_in_memory().await.unwrap();

        let mut create = AuditEntry::new(
            "store-a",
            ActionCode::ProductCreate,
            AuditCategory::Product,
        );
        create.upc = Some("300001".into());
        insert(&db, &create).await.unwrap();

        let mut adjust = AuditEntry::new(
            "store-a",
            ActionCode::InventoryAdjustment,
            AuditCategory::Inventory,
        );
        adjust.upc = Some("300001".into());
        insert(&db, &adjust).await.unwrap();

        let other_store = AuditEntry::new(
            "store-b",
            ActionCode::ProductCreate,
            AuditCategory::Product,
        );
        insert(&db, &other_store).await.unwrap();

        let (items, total) = list_with_filters(
            &db,
            "store-a",
            Some("INVENTORY"),
            None,
            Some("300001"),
            None,
            None,
            None,
            10,
        )
        .await
        .unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].action, ActionCode::InventoryAdjustment);

        let (_, all_in_store) =
            list_with_filters(&db, "store-a", None, None, None, None, None, None, 10)
                .await
                .unwrap();
        assert_eq!(all_in_store, 2);
    }
}
