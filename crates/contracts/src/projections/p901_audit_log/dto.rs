use crate::domain::common::{AggregateId, AggregateRoot};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Enums
// ============================================================================

/// Код действия в журнале аудита
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionCode {
    ProductCreate,
    ProductUpdate,
    ProductDeactivate,
    ProductPurge,
    PriceChange,
    InventoryAdjustment,
    InventoryIncrease,
    InventoryDecrease,
    TransactionCreate,
    TransactionCreateFailed,
}

impl ActionCode {
    /// Получить код действия
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCode::ProductCreate => "PRODUCT_CREATE",
            ActionCode::ProductUpdate => "PRODUCT_UPDATE",
            ActionCode::ProductDeactivate => "PRODUCT_DEACTIVATE",
            ActionCode::ProductPurge => "PRODUCT_PURGE",
            ActionCode::PriceChange => "PRICE_CHANGE",
            ActionCode::InventoryAdjustment => "INVENTORY_ADJUSTMENT",
            ActionCode::InventoryIncrease => "INVENTORY_INCREASE",
            ActionCode::InventoryDecrease => "INVENTORY_DECREASE",
            ActionCode::TransactionCreate => "TRANSACTION_CREATE",
            ActionCode::TransactionCreateFailed => "TRANSACTION_CREATE_FAILED",
        }
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PRODUCT_CREATE" => Some(ActionCode::ProductCreate),
            "PRODUCT_UPDATE" => Some(ActionCode::ProductUpdate),
            "PRODUCT_DEACTIVATE" => Some(ActionCode::ProductDeactivate),
            "PRODUCT_PURGE" => Some(ActionCode::ProductPurge),
            "PRICE_CHANGE" => Some(ActionCode::PriceChange),
            "INVENTORY_ADJUSTMENT" => Some(ActionCode::InventoryAdjustment),
            "INVENTORY_INCREASE" => Some(ActionCode::InventoryIncrease),
            "INVENTORY_DECREASE" => Some(ActionCode::InventoryDecrease),
            "TRANSACTION_CREATE" => Some(ActionCode::TransactionCreate),
            "TRANSACTION_CREATE_FAILED" => Some(ActionCode::TransactionCreateFailed),
            _ => None,
        }
    }
}

/// Категория записи аудита
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditCategory {
    Product,
    Inventory,
    Transaction,
    User,
    System,
    PriceChange,
    Supplier,
}

impl AuditCategory {
    /// Получить код категории
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditCategory::Product => "PRODUCT",
            AuditCategory::Inventory => "INVENTORY",
            AuditCategory::Transaction => "TRANSACTION",
            AuditCategory::User => "USER",
            AuditCategory::System => "SYSTEM",
            AuditCategory::PriceChange => "PRICE_CHANGE",
            AuditCategory::Supplier => "SUPPLIER",
        }
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PRODUCT" => Some(AuditCategory::Product),
            "INVENTORY" => Some(AuditCategory::Inventory),
            "TRANSACTION" => Some(AuditCategory::Transaction),
            "USER" => Some(AuditCategory::User),
            "SYSTEM" => Some(AuditCategory::System),
            "PRICE_CHANGE" => Some(AuditCategory::PriceChange),
            "SUPPLIER" => Some(AuditCategory::Supplier),
            _ => None,
        }
    }
}

/// Серьёзность записи аудита
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl AuditSeverity {
    /// Получить код серьёзности
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditSeverity::Info => "INFO",
            AuditSeverity::Warning => "WARNING",
            AuditSeverity::Error => "ERROR",
            AuditSeverity::Critical => "CRITICAL",
        }
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "INFO" => Some(AuditSeverity::Info),
            "WARNING" => Some(AuditSeverity::Warning),
            "ERROR" => Some(AuditSeverity::Error),
            "CRITICAL" => Some(AuditSeverity::Critical),
            _ => None,
        }
    }
}

// ============================================================================
// Entry
// ============================================================================

/// Изменение одного поля (для списка changes)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old_value: serde_json::Value,
    pub new_value: serde_json::Value,
}

/// Запись журнала аудита (P901)
///
/// Неизменяема после вставки: хранилище отклоняет UPDATE/DELETE,
/// репозиторий не предоставляет путей изменения. Неудачные попытки
/// тоже записываются (success = false).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,

    // Dimensions
    pub store_id: String,
    pub actor_id: Option<String>,
    pub actor_name: Option<String>,
    pub action: ActionCode,
    pub category: AuditCategory,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,

    // Changes
    pub changes: Vec<FieldChange>,

    // Metadata
    pub upc: Option<String>,
    pub product_name: Option<String>,
    pub transaction_number: Option<String>,
    pub reason: Option<String>,
    /// Произвольный контекст запроса (ip, user-agent и т.п.)
    pub extra: Option<serde_json::Value>,

    // Status
    pub severity: AuditSeverity,
    pub success: bool,
    pub error_message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl AuditEntry {
    /// Создать запись с заполненными по умолчанию полями
    pub fn new(store_id: impl Into<String>, action: ActionCode, category: AuditCategory) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.into(),
            actor_id: None,
            actor_name: None,
            action,
            category,
            entity_type: None,
            entity_id: None,
            changes: Vec::new(),
            upc: None,
            product_name: None,
            transaction_number: None,
            reason: None,
            extra: None,
            severity: AuditSeverity::Info,
            success: true,
            error_message: None,
            created_at: chrono::Utc::now(),
        }
    }

    /// Проставить ссылку на затронутый агрегат (entity_type + entity_id)
    pub fn set_entity<A>(&mut self, aggregate: &A)
    where
        A: AggregateRoot,
        A::Id: AggregateId,
    {
        self.entity_type = Some(A::full_name());
        self.entity_id = Some(aggregate.id().as_string());
    }
}

// ============================================================================
// List Request / Response
// ============================================================================

/// Запрос на получение журнала аудита с фильтрами
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditListRequest {
    pub store_id: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub upc: Option<String>,
    #[serde(default)]
    pub transaction_number: Option<String>,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    100
}

/// Ответ со списком записей аудита
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditListResponse {
    pub items: Vec<AuditEntry>,
    pub total_count: i32,
    pub has_more: bool,
}
