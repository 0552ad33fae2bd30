use super::repository;
use contracts::engine::EngineError;
use contracts::projections::p901_audit_log::{
    ActionCode, AuditCategory, AuditEntry, AuditListRequest, AuditListResponse,
};
use sea_orm::{ConnectionTrait, DatabaseConnection};

use crate::shared::dates::parse_date_param;

/// Записать событие в журнал аудита.
///
/// Сбой журнала не считается сбоем операции: ошибка логируется,
/// вызывающему ничего не возвращается.
pub async fn append<C: ConnectionTrait>(db: &C, entry: AuditEntry) {
    if let Err(e) = repository::insert(db, &entry).await {
        tracing::error!(
            "Audit append failed: action={} store={} entity={:?}: {}",
            entry.action.as_str(),
            entry.store_id,
            entry.entity_id,
            e
        );
    }
}

/// Получить журнал аудита магазина с фильтрами
pub async fn list(
    db: &DatabaseConnection,
    req: AuditListRequest,
) -> Result<AuditListResponse, EngineError> {
    if req.store_id.trim().is_empty() {
        return Err(EngineError::invalid("store_id is required"));
    }
    if let Some(category) = &req.category {
        if AuditCategory::from_code(category).is_none() {
            return Err(EngineError::invalid(format!(
                "unknown audit category: {}",
                category
            )));
        }
    }
    if let Some(action) = &req.action {
        if ActionCode::from_code(action).is_none() {
            return Err(EngineError::invalid(format!(
                "unknown audit action: {}",
                action
            )));
        }
    }
    let date_from =
        parse_date_param(req.date_from.as_deref(), "date_from").map_err(EngineError::invalid)?;
    let date_to =
        parse_date_param(req.date_to.as_deref(), "date_to").map_err(EngineError::invalid)?;

    let (items, total_count) = repository::list_with_filters(
        db,
        &req.store_id,
        req.category.as_deref(),
        req.action.as_deref(),
        req.upc.as_deref(),
        req.transaction_number.as_deref(),
        date_from,
        date_to,
        req.limit,
    )
    .await
    .map_err(EngineError::persistence)?;

    Ok(AuditListResponse {
        has_more: (items.len() as i32) < total_count,
        total_count,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    #[tokio::test]
    async fn test_append_failure_does_not_propagate() {
        let db = connect_in_memory().await.unwrap();
        db.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "DROP TABLE p901_audit_log;".to_string(),
        ))
        .await
        .unwrap();

        // Журнал недоступен: запись теряется, но вызов не падает
        append(
            &db,
            AuditEntry::new("store-a", ActionCode::ProductCreate, AuditCategory::Product),
        )
        .await;
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_category() {
        let db = connect_in_memory().await.unwrap();

        let result = list(
            &db,
            AuditListRequest {
                store_id: "store-a".into(),
                category: Some("NOT_A_CATEGORY".into()),
                action: None,
                upc: None,
                transaction_number: None,
                date_from: None,
                date_to: None,
                limit: 10,
            },
        )
        .await;
        assert!(matches!(result, Err(EngineError::InvalidRequest(_))));
    }
}
