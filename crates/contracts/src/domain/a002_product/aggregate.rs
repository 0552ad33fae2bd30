use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор товара
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub Uuid);

impl ProductId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for ProductId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ProductId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Товар каталога магазина
///
/// Идентичность товара — пара (store_id, upc), уникальная в пределах системы.
/// Поле inventory изменяется только движком транзакций.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(flatten)]
    pub base: BaseAggregate<ProductId>,

    /// ID магазина-владельца (ссылка на a001_store)
    #[serde(rename = "storeId")]
    pub store_id: String,

    /// Штрихкод товара (UPC)
    pub upc: String,

    /// Розничная цена
    pub price: f64,

    /// Себестоимость
    pub cost: f64,

    /// ID поставщика
    #[serde(rename = "supplierId")]
    pub supplier_id: Option<String>,

    /// Название поставщика (денормализовано)
    #[serde(rename = "supplierName")]
    pub supplier_name: Option<String>,

    /// Остаток на складе
    pub inventory: i64,

    /// Активен ли товар (false — снят с продажи)
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

impl Product {
    /// Создать новый товар для вставки в БД
    #[allow(clippy::too_many_arguments)]
    pub fn new_for_insert(
        store_id: String,
        upc: String,
        description: String,
        price: f64,
        cost: f64,
        supplier_id: Option<String>,
        supplier_name: Option<String>,
        inventory: i64,
        comment: Option<String>,
    ) -> Self {
        let mut base = BaseAggregate::new(ProductId::new_v4(), upc.clone(), description);
        base.comment = comment;

        Self {
            base,
            store_id,
            upc,
            price,
            cost,
            supplier_id,
            supplier_name,
            inventory,
            is_active: true,
        }
    }

    /// Получить ID как строку
    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Обновить timestamp
    pub fn touch_updated(&mut self) {
        self.base.touch();
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.store_id.trim().is_empty() {
            return Err("ID магазина не может быть пустым".into());
        }
        if self.upc.trim().is_empty() {
            return Err("UPC не может быть пустым".into());
        }
        if self.base.description.trim().is_empty() {
            return Err("Название товара не может быть пустым".into());
        }
        if self.price < 0.0 {
            return Err("Цена не может быть отрицательной".into());
        }
        if self.cost < 0.0 {
            return Err("Себестоимость не может быть отрицательной".into());
        }

        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.touch_updated();
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "product"
    }
}
