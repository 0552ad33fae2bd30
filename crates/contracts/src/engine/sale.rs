use crate::domain::a003_sale_transaction::{PaymentMethod, SaleTransaction};
use serde::{Deserialize, Serialize};

/// Префиксы UPC внекаталожных позиций (свободный ввод и позиции меню).
/// Такие строки оцениваются из запроса и не затрагивают каталог.
pub const OFF_CATALOG_UPC_PREFIXES: [&str; 2] = ["MANUAL-", "MENU-"];

/// Является ли UPC внекаталожным
pub fn is_off_catalog_upc(upc: &str) -> bool {
    OFF_CATALOG_UPC_PREFIXES
        .iter()
        .any(|prefix| upc.starts_with(prefix))
}

// ============================================================================
// Request
// ============================================================================

/// Строка запроса продажи
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLineRequest {
    pub upc: String,
    /// Количество (отрицательное — возврат)
    pub quantity: i64,
    /// Название внекаталожной позиции
    #[serde(default)]
    pub name: Option<String>,
    /// Цена внекаталожной позиции
    #[serde(default)]
    pub price: Option<f64>,
}

/// Запрос на проведение продажи
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRequest {
    pub store_id: String,
    pub items: Vec<SaleLineRequest>,
    /// Сумма налога по чеку
    #[serde(default)]
    pub tax: f64,
    pub payment_method: PaymentMethod,
    /// Принято наличными (обязательно при payment_method = cash)
    #[serde(default)]
    pub cash_given: Option<f64>,
    /// Ключ идемпотентности для безопасного повтора
    #[serde(default)]
    pub idempotency_key: Option<String>,
    #[serde(default)]
    pub actor_id: Option<String>,
}

// ============================================================================
// Response
// ============================================================================

/// Предупреждение о нехватке остатка по строке чека
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryWarning {
    pub upc: String,
    pub product_name: String,
    pub requested: i64,
    pub available: i64,
}

/// Результат проведения продажи
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleOutcome {
    pub transaction: SaleTransaction,
    pub warnings: Vec<InventoryWarning>,
    /// true — возвращён ранее зафиксированный чек по тому же ключу идемпотентности
    pub idempotent_replay: bool,
}
