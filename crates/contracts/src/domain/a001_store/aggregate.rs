use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор магазина
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreId(pub Uuid);

impl StoreId {
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

impl AggregateId for StoreId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(StoreId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Магазин (арендатор системы, владелец каталога и запасов)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    #[serde(flatten)]
    pub base: BaseAggregate<StoreId>,

    /// Адрес магазина
    pub address: Option<String>,

    /// Контактные данные (телефон, email)
    pub contact: Option<String>,

    /// Активен ли магазин
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

impl Store {
    /// Создать новый магазин для вставки в БД
    pub fn new_for_insert(
        code: String,
        description: String,
        address: Option<String>,
        contact: Option<String>,
        comment: Option<String>,
    ) -> Self {
        let mut base = BaseAggregate::new(StoreId::new_v4(), code, description);
        base.comment = comment;

        Self {
            base,
            address,
            contact,
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

    /// Обновить данные из DTO
    pub fn update(&mut self, dto: &StoreDto) {
        self.base.code = dto.code.clone().unwrap_or_default();
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.address = dto.address.clone();
        self.contact = dto.contact.clone();
        if let Some(is_active) = dto.is_active {
            self.is_active = is_active;
        }
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Название магазина не может быть пустым".into());
        }
        if self.base.code.trim().is_empty() {
            return Err("Код магазина не может быть пустым".into());
        }

        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.touch_updated();
    }
}

impl AggregateRoot for Store {
    type Id = StoreId;

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
        "a001"
    }

    fn collection_name() -> &'static str {
        "store"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления магазина
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
    pub comment: Option<String>,
}
