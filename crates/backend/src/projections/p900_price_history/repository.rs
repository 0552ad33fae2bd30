use anyhow::Result;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use contracts::projections::p900_price_history::PriceHistoryEntry;
use sea_orm::entity::prelude::*;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "p900_price_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    // Dimensions
    pub store_id: String,
    pub product_id: String,
    pub upc: String,
    pub product_name: String,

    // Price movement
    pub old_price: f64,
    pub new_price: f64,
    pub old_cost: f64,
    pub new_cost: f64,
    #[sea_orm(nullable)]
    pub price_change_percent: Option<f64>,

    // Info fields
    pub actor_id: Option<String>,
    pub change_reason: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PriceHistoryEntry {
    fn from(m: Model) -> Self {
        PriceHistoryEntry {
            id: m.id,
            store_id: m.store_id,
            product_id: m.product_id,
            upc: m.upc,
            product_name: m.product_name,
            old_price: m.old_price,
            new_price: m.new_price,
            old_cost: m.old_cost,
            new_cost: m.new_cost,
            price_change_percent: m.price_change_percent,
            actor_id: m.actor_id,
            change_reason: m.change_reason,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

pub async fn insert<C: ConnectionTrait>(db: &C, entry: &PriceHistoryEntry) -> Result<()> {
    let active = ActiveModel {
        id: Set(entry.id.clone()),
        store_id: Set(entry.store_id.clone()),
        product_id: Set(entry.product_id.clone()),
        upc: Set(entry.upc.clone()),
        product_name: Set(entry.product_name.clone()),
        old_price: Set(entry.old_price),
        new_price: Set(entry.new_price),
        old_cost: Set(entry.old_cost),
        new_cost: Set(entry.new_cost),
        price_change_percent: Set(entry.price_change_percent),
        actor_id: Set(entry.actor_id.clone()),
        change_reason: Set(entry.change_reason.clone()),
        created_at: Set(Some(entry.created_at)),
    };
    active.insert(db).await?;
    Ok(())
}

/// Получить историю цен с фильтрами (новые сверху) и общее число записей
pub async fn list_with_filters<C: ConnectionTrait>(
    db: &C,
    store_id: &str,
    upc: Option<&str>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    limit: u64,
) -> Result<(Vec<PriceHistoryEntry>, i32)> {
    let mut query = Entity::find().filter(Column::StoreId.eq(store_id));

    if let Some(u) = upc {
        query = query.filter(Column::Upc.eq(u));
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
