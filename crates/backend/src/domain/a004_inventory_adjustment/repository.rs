use anyhow::Result;
use chrono::Utc;
use contracts::domain::a004_inventory_adjustment::{
    AdjustmentType, InventoryAdjustment, InventoryAdjustmentId,
};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a004_inventory_adjustment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub store_id: String,
    pub product_id: String,
    pub upc: String,
    pub product_name: String,
    pub adjustment_type: String,
    pub quantity_before: i64,
    pub quantity_after: i64,
    pub quantity_changed: i64,
    pub reason: String,
    pub actor_id: Option<String>,
    pub actor_name: Option<String>,
    pub related_transaction: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for InventoryAdjustment {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let adjustment_type = AdjustmentType::from_code(&m.adjustment_type).unwrap_or_else(|| {
            panic!(
                "Unknown adjustment type for adjustment {}: {}",
                m.id, m.adjustment_type
            )
        });

        InventoryAdjustment {
            base: BaseAggregate::with_metadata(
                InventoryAdjustmentId(uuid),
                m.code,
                m.description,
                m.comment.clone(),
                metadata,
            ),
            store_id: m.store_id,
            product_id: m.product_id,
            upc: m.upc,
            product_name: m.product_name,
            adjustment_type,
            quantity_before: m.quantity_before,
            quantity_after: m.quantity_after,
            quantity_changed: m.quantity_changed,
            reason: m.reason,
            actor_id: m.actor_id,
            actor_name: m.actor_name,
            related_transaction: m.related_transaction,
        }
    }
}

pub async fn insert<C: ConnectionTrait>(db: &C, aggregate: &InventoryAdjustment) -> Result<Uuid> {
    let uuid = aggregate.base.id.value();
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        store_id: Set(aggregate.store_id.clone()),
        product_id: Set(aggregate.product_id.clone()),
        upc: Set(aggregate.upc.clone()),
        product_name: Set(aggregate.product_name.clone()),
        adjustment_type: Set(aggregate.adjustment_type.as_str().to_string()),
        quantity_before: Set(aggregate.quantity_before),
        quantity_after: Set(aggregate.quantity_after),
        quantity_changed: Set(aggregate.quantity_changed),
        reason: Set(aggregate.reason.clone()),
        actor_id: Set(aggregate.actor_id.clone()),
        actor_name: Set(aggregate.actor_name.clone()),
        related_transaction: Set(aggregate.related_transaction.clone()),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    };
    active.insert(db).await?;
    Ok(uuid)
}

pub async fn list_by_store<C: ConnectionTrait>(
    db: &C,
    store_id: &str,
    upc: Option<&str>,
    adjustment_type: Option<AdjustmentType>,
    limit: u64,
) -> Result<Vec<InventoryAdjustment>> {
    let mut query = Entity::find().filter(Column::StoreId.eq(store_id));
    if let Some(upc) = upc {
        query = query.filter(Column::Upc.eq(upc));
    }
    if let Some(adjustment_type) = adjustment_type {
        query = query.filter(Column::AdjustmentType.eq(adjustment_type.as_str()));
    }
    let items = query
        .order_by_desc(Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}
