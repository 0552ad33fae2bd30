use chrono::Utc;
use contracts::domain::a002_product::{Product, ProductId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub store_id: String,
    pub upc: String,
    pub price: f64,
    pub cost: f64,
    pub supplier_id: Option<String>,
    pub supplier_name: Option<String>,
    pub inventory: i64,
    pub is_active: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Product {
            base: BaseAggregate::with_metadata(
                ProductId(uuid),
                m.code,
                m.description,
                m.comment.clone(),
                metadata,
            ),
            store_id: m.store_id,
            upc: m.upc,
            price: m.price,
            cost: m.cost,
            supplier_id: m.supplier_id,
            supplier_name: m.supplier_name,
            inventory: m.inventory,
            is_active: m.is_active,
        }
    }
}

/// Поиск товара по идентичности (store_id, upc)
pub async fn find_by_upc<C: ConnectionTrait>(
    db: &C,
    store_id: &str,
    upc: &str,
) -> anyhow::Result<Option<Product>> {
    let result = Entity::find()
        .filter(Column::StoreId.eq(store_id))
        .filter(Column::Upc.eq(upc))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn list_by_store<C: ConnectionTrait>(
    db: &C,
    store_id: &str,
    include_inactive: bool,
) -> anyhow::Result<Vec<Product>> {
    let mut query = Entity::find().filter(Column::StoreId.eq(store_id));
    if !include_inactive {
        query = query.filter(Column::IsActive.eq(true));
    }
    let mut items: Vec<Product> = query.all(db).await?.into_iter().map(Into::into).collect();
    items.sort_by(|a, b| {
        a.base
            .description
            .to_lowercase()
            .cmp(&b.base.description.to_lowercase())
    });
    Ok(items)
}

pub async fn insert<C: ConnectionTrait>(db: &C, aggregate: &Product) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        store_id: Set(aggregate.store_id.clone()),
        upc: Set(aggregate.upc.clone()),
        price: Set(aggregate.price),
        cost: Set(aggregate.cost),
        supplier_id: Set(aggregate.supplier_id.clone()),
        supplier_name: Set(aggregate.supplier_name.clone()),
        inventory: Set(aggregate.inventory),
        is_active: Set(aggregate.is_active),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    };
    active.insert(db).await?;
    Ok(uuid)
}

pub async fn update<C: ConnectionTrait>(db: &C, aggregate: &Product) -> anyhow::Result<()> {
    let id = aggregate.base.id.value().to_string();
    let active = ActiveModel {
        id: Set(id),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        store_id: Set(aggregate.store_id.clone()),
        upc: Set(aggregate.upc.clone()),
        price: Set(aggregate.price),
        cost: Set(aggregate.cost),
        supplier_id: Set(aggregate.supplier_id.clone()),
        supplier_name: Set(aggregate.supplier_name.clone()),
        inventory: Set(aggregate.inventory),
        is_active: Set(aggregate.is_active),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
        created_at: sea_orm::ActiveValue::NotSet,
    };
    active.update(db).await?;
    Ok(())
}

/// Сдвинуть остаток на delta (инкремент выполняется в SQL, а не в памяти)
pub async fn apply_inventory_delta<C: ConnectionTrait>(
    db: &C,
    store_id: &str,
    upc: &str,
    delta: i64,
) -> anyhow::Result<()> {
    use sea_orm::sea_query::Expr;
    Entity::update_many()
        .col_expr(Column::Inventory, Expr::col(Column::Inventory).add(delta))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::StoreId.eq(store_id))
        .filter(Column::Upc.eq(upc))
        .exec(db)
        .await?;
    Ok(())
}

/// Установить остаток в абсолютное значение
pub async fn set_inventory<C: ConnectionTrait>(
    db: &C,
    store_id: &str,
    upc: &str,
    value: i64,
) -> anyhow::Result<()> {
    use sea_orm::sea_query::Expr;
    Entity::update_many()
        .col_expr(Column::Inventory, Expr::value(value))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::StoreId.eq(store_id))
        .filter(Column::Upc.eq(upc))
        .exec(db)
        .await?;
    Ok(())
}

/// Пометить товар снятым с продажи
pub async fn set_inactive<C: ConnectionTrait>(
    db: &C,
    store_id: &str,
    upc: &str,
) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::IsActive, Expr::value(false))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::StoreId.eq(store_id))
        .filter(Column::Upc.eq(upc))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Физическое удаление записи товара
pub async fn hard_delete<C: ConnectionTrait>(
    db: &C,
    store_id: &str,
    upc: &str,
) -> anyhow::Result<bool> {
    let result = Entity::delete_many()
        .filter(Column::StoreId.eq(store_id))
        .filter(Column::Upc.eq(upc))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

    fn sample_product(store_id: &str, upc: &str, inventory: i64) -> Product {
        Product::new_for_insert(
            store_id.to_string(),
            upc.to_string(),
            format!("Товар {}", upc),
            10.0,
            4.0,
            None,
            None,
            inventory,
            None,
        )
    }

    #[tokio::test]
    async fn test_find_by_upc_is_store_scoped() {
        let db = connect_in_memory().await.unwrap();

        insert(&db, &sample_product("store-a", "100001", 5))
            .await
            .unwrap();
        insert(&db, &sample_product("store-b", "100001", 77))
            .await
            .unwrap();

        let a = find_by_upc(&db, "store-a", "100001")
            .await
            .unwrap()
            .unwrap();
        let b = find_by_upc(&db, "store-b", "100001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(a.inventory, 5);
        assert_eq!(b.inventory, 77);
        assert_ne!(a.base.id, b.base.id);

        let missing = find_by_upc(&db, "store-c", "100001").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_apply_inventory_delta() {
        let db = connect_in_memory().await.unwrap();
        insert(&db, &sample_product("store-a", "100002", 10))
            .await
            .unwrap();

        apply_inventory_delta(&db, "store-a", "100002", -3)
            .await
            .unwrap();
        apply_inventory_delta(&db, "store-a", "100002", -4)
            .await
            .unwrap();

        let p = find_by_upc(&db, "store-a", "100002")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.inventory, 3);
    }

    #[tokio::test]
    async fn test_duplicate_upc_rejected_by_index() {
        let db = connect_in_memory().await.unwrap();
        insert(&db, &sample_product("store-a", "100003", 1))
            .await
            .unwrap();

        let duplicate = insert(&db, &sample_product("store-a", "100003", 2)).await;
        assert!(duplicate.is_err());
    }
}
