use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор корректировки запасов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryAdjustmentId(pub Uuid);

impl InventoryAdjustmentId {
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

impl AggregateId for InventoryAdjustmentId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(InventoryAdjustmentId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Тип корректировки запасов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentType {
    Manual,
    Waste,
    Damage,
    Theft,
    Return,
    Correction,
    Expired,
    Reconcile,
}

impl AdjustmentType {
    /// Получить код типа корректировки
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentType::Manual => "MANUAL",
            AdjustmentType::Waste => "WASTE",
            AdjustmentType::Damage => "DAMAGE",
            AdjustmentType::Theft => "THEFT",
            AdjustmentType::Return => "RETURN",
            AdjustmentType::Correction => "CORRECTION",
            AdjustmentType::Expired => "EXPIRED",
            AdjustmentType::Reconcile => "RECONCILE",
        }
    }

    /// Получить человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            AdjustmentType::Manual => "Ручная корректировка",
            AdjustmentType::Waste => "Потери",
            AdjustmentType::Damage => "Повреждение",
            AdjustmentType::Theft => "Хищение",
            AdjustmentType::Return => "Возврат",
            AdjustmentType::Correction => "Исправление",
            AdjustmentType::Expired => "Истёк срок годности",
            AdjustmentType::Reconcile => "Сверка остатков",
        }
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "MANUAL" => Some(AdjustmentType::Manual),
            "WASTE" => Some(AdjustmentType::Waste),
            "DAMAGE" => Some(AdjustmentType::Damage),
            "THEFT" => Some(AdjustmentType::Theft),
            "RETURN" => Some(AdjustmentType::Return),
            "CORRECTION" => Some(AdjustmentType::Correction),
            "EXPIRED" => Some(AdjustmentType::Expired),
            "RECONCILE" => Some(AdjustmentType::Reconcile),
            _ => None,
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Корректировка запасов (документ, append-only)
///
/// Инвариант: quantity_after = quantity_before + quantity_changed, и после
/// фиксации совпадает с остатком товара. base.comment хранит примечания,
/// в том числе зафиксированное расхождение при сверке.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryAdjustment {
    #[serde(flatten)]
    pub base: BaseAggregate<InventoryAdjustmentId>,

    /// ID магазина (ссылка на a001_store)
    #[serde(rename = "storeId")]
    pub store_id: String,

    /// ID товара каталога (ссылка на a002_product)
    #[serde(rename = "productId")]
    pub product_id: String,

    /// Штрихкод товара
    pub upc: String,

    /// Название товара на момент корректировки
    #[serde(rename = "productName")]
    pub product_name: String,

    /// Тип корректировки
    #[serde(rename = "adjustmentType")]
    pub adjustment_type: AdjustmentType,

    /// Остаток до корректировки
    #[serde(rename = "quantityBefore")]
    pub quantity_before: i64,

    /// Остаток после корректировки
    #[serde(rename = "quantityAfter")]
    pub quantity_after: i64,

    /// Изменение остатка (after − before)
    #[serde(rename = "quantityChanged")]
    pub quantity_changed: i64,

    /// Причина корректировки (обязательна)
    pub reason: String,

    /// ID сотрудника
    #[serde(rename = "actorId")]
    pub actor_id: Option<String>,

    /// Имя сотрудника
    #[serde(rename = "actorName")]
    pub actor_name: Option<String>,

    /// Номер связанного чека (для возвратов)
    #[serde(rename = "relatedTransaction")]
    pub related_transaction: Option<String>,
}

impl InventoryAdjustment {
    /// Создать новую корректировку для вставки в БД
    #[allow(clippy::too_many_arguments)]
    pub fn new_for_insert(
        code: String,
        description: String,
        store_id: String,
        product_id: String,
        upc: String,
        product_name: String,
        adjustment_type: AdjustmentType,
        quantity_before: i64,
        quantity_after: i64,
        reason: String,
        actor_id: Option<String>,
        actor_name: Option<String>,
        related_transaction: Option<String>,
        comment: Option<String>,
    ) -> Self {
        let mut base = BaseAggregate::new(InventoryAdjustmentId::new_v4(), code, description);
        base.comment = comment;

        Self {
            base,
            store_id,
            product_id,
            upc,
            product_name,
            adjustment_type,
            quantity_before,
            quantity_after,
            quantity_changed: quantity_after - quantity_before,
            reason,
            actor_id,
            actor_name,
            related_transaction,
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
        if self.product_name.trim().is_empty() {
            return Err("Название товара не может быть пустым".into());
        }
        if self.reason.trim().is_empty() {
            return Err("Причина корректировки обязательна".into());
        }
        if self.quantity_after != self.quantity_before + self.quantity_changed {
            return Err("Нарушен инвариант количеств (after ≠ before + change)".into());
        }

        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.touch_updated();
    }
}

impl AggregateRoot for InventoryAdjustment {
    type Id = InventoryAdjustmentId;

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
        "a004"
    }

    fn collection_name() -> &'static str {
        "inventory_adjustment"
    }
}
