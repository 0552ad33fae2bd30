use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use contracts::domain::a003_sale_transaction::{
    PaymentMethod, SaleLine, SaleTransaction, SaleTransactionId,
};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_sale_transaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub store_id: String,
    pub lines_json: String,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub payment_method: String,
    pub cash_given: Option<f64>,
    pub change_given: Option<f64>,
    pub idempotency_key: Option<String>,
    pub actor_id: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SaleTransaction {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        let lines: Vec<SaleLine> = serde_json::from_str(&m.lines_json).unwrap_or_else(|_| {
            panic!("Failed to deserialize lines_json for transaction: {}", m.code)
        });
        let payment_method = PaymentMethod::from_code(&m.payment_method).unwrap_or_else(|| {
            panic!(
                "Unknown payment method for transaction {}: {}",
                m.code, m.payment_method
            )
        });

        SaleTransaction {
            base: BaseAggregate::with_metadata(
                SaleTransactionId(uuid),
                m.code,
                m.description,
                m.comment.clone(),
                metadata,
            ),
            store_id: m.store_id,
            lines,
            subtotal: m.subtotal,
            tax: m.tax,
            total: m.total,
            payment_method,
            cash_given: m.cash_given,
            change_given: m.change_given,
            idempotency_key: m.idempotency_key,
            actor_id: m.actor_id,
        }
    }
}

pub async fn insert<C: ConnectionTrait>(db: &C, aggregate: &SaleTransaction) -> Result<Uuid> {
    let uuid = aggregate.base.id.value();
    let lines_json = serde_json::to_string(&aggregate.lines)?;

    let active = ActiveModel {
        id: Set(uuid.to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        store_id: Set(aggregate.store_id.clone()),
        lines_json: Set(lines_json),
        subtotal: Set(aggregate.subtotal),
        tax: Set(aggregate.tax),
        total: Set(aggregate.total),
        payment_method: Set(aggregate.payment_method.as_str().to_string()),
        cash_given: Set(aggregate.cash_given),
        change_given: Set(aggregate.change_given),
        idempotency_key: Set(aggregate.idempotency_key.clone()),
        actor_id: Set(aggregate.actor_id.clone()),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    };
    active.insert(db).await?;
    Ok(uuid)
}

pub async fn find_by_number<C: ConnectionTrait>(
    db: &C,
    transaction_number: &str,
) -> Result<Option<SaleTransaction>> {
    let result = Entity::find()
        .filter(Column::Code.eq(transaction_number))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

/// Поиск ранее зафиксированного чека по ключу идемпотентности
pub async fn find_by_idempotency_key<C: ConnectionTrait>(
    db: &C,
    store_id: &str,
    idempotency_key: &str,
) -> Result<Option<SaleTransaction>> {
    let result = Entity::find()
        .filter(Column::StoreId.eq(store_id))
        .filter(Column::IdempotencyKey.eq(idempotency_key))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn list_by_store<C: ConnectionTrait>(
    db: &C,
    store_id: &str,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    limit: u64,
) -> Result<Vec<SaleTransaction>> {
    let mut query = Entity::find().filter(Column::StoreId.eq(store_id));
    if let Some(from) = date_from {
        let from_dt = Utc.from_utc_datetime(&from.and_time(chrono::NaiveTime::MIN));
        query = query.filter(Column::CreatedAt.gte(from_dt));
    }
    if let Some(to) = date_to {
        // Верхняя граница — начало следующего дня (включаем весь date_to)
        if let Some(next) = to.succ_opt() {
            let to_dt = Utc.from_utc_datetime(&next.and_time(chrono::NaiveTime::MIN));
            query = query.filter(Column::CreatedAt.lt(to_dt));
        }
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

pub async fn count_by_store<C: ConnectionTrait>(db: &C, store_id: &str) -> Result<u64> {
    use sea_orm::PaginatorTrait;
    let count = Entity::find()
        .filter(Column::StoreId.eq(store_id))
        .count(db)
        .await?;
    Ok(count)
}
