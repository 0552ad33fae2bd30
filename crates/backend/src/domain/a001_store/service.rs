use super::repository;
use contracts::domain::a001_store::{Store, StoreDto};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

/// Создание нового магазина
pub async fn create(db: &DatabaseConnection, dto: StoreDto) -> anyhow::Result<Uuid> {
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("STORE-{}", Uuid::new_v4()));
    let mut aggregate = Store::new_for_insert(
        code,
        dto.description,
        dto.address,
        dto.contact,
        dto.comment,
    );
    if let Some(is_active) = dto.is_active {
        aggregate.is_active = is_active;
    }

    // Валидация
    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    // Before write
    aggregate.before_write();

    // Сохранение через repository
    repository::insert(db, &aggregate).await
}

/// Обновление существующего магазина
pub async fn update(db: &DatabaseConnection, dto: StoreDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| anyhow::anyhow!("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Not found"))?;

    aggregate.update(&dto);

    // Валидация
    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    // Before write
    aggregate.before_write();

    // Сохранение
    repository::update(db, &aggregate).await
}

/// Получение магазина по ID
pub async fn get_by_id(db: &DatabaseConnection, id: Uuid) -> anyhow::Result<Option<Store>> {
    repository::get_by_id(db, id).await
}

/// Получение списка всех магазинов
pub async fn list_all(db: &DatabaseConnection) -> anyhow::Result<Vec<Store>> {
    repository::list_all(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

    #[tokio::test]
    async fn test_create_and_get_store() {
        let db = connect_in_memory().await.unwrap();

        let id = create(
            &db,
            StoreDto {
                id: None,
                code: Some("STORE-001".into()),
                description: "Продукты на Ленина".into(),
                address: Some("ул. Ленина, 1".into()),
                contact: None,
                is_active: None,
                comment: None,
            },
        )
        .await
        .unwrap();

        let store = get_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(store.base.code, "STORE-001");
        assert_eq!(store.base.description, "Продукты на Ленина");
        assert!(store.is_active);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let db = connect_in_memory().await.unwrap();

        let result = create(
            &db,
            StoreDto {
                id: None,
                code: Some("STORE-002".into()),
                description: "".into(),
                address: None,
                contact: None,
                is_active: None,
                comment: None,
            },
        )
        .await;
        assert!(result.is_err());
    }
}
