use serde::{Deserialize, Serialize};

/// Запись истории цен (P900)
///
/// Добавляется при создании товара (старые значения 0) и при каждом
/// последующем изменении цены или себестоимости. Только добавление,
/// хронологический порядок в пределах товара.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
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
    /// Процент изменения цены (None, если old_price = 0)
    pub price_change_percent: Option<f64>,

    // Info fields
    pub actor_id: Option<String>,
    pub change_reason: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Запрос на получение истории цен с фильтрами
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceHistoryListRequest {
    pub store_id: String,
    #[serde(default)]
    pub upc: Option<String>,
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

/// Ответ со списком истории цен
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceHistoryListResponse {
    pub items: Vec<PriceHistoryEntry>,
    pub total_count: i32,
    pub has_more: bool,
}
