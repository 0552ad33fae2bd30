use crate::domain::a002_product::Product;
use crate::projections::p901_audit_log::FieldChange;
use serde::{Deserialize, Serialize};

/// Запрос на создание товара
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub store_id: String,
    pub upc: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    /// Начальный остаток
    #[serde(default)]
    pub inventory: i64,
    #[serde(default)]
    pub actor_id: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Набор изменяемых полей товара. None — поле не меняется.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    /// Дельта остатка (взаимоисключимо с set_inventory)
    #[serde(default)]
    pub add_inventory: Option<i64>,
    /// Абсолютный остаток (взаимоисключимо с add_inventory)
    #[serde(default)]
    pub set_inventory: Option<i64>,
    #[serde(default)]
    pub actor_id: Option<String>,
}

/// Результат обновления товара
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatedProduct {
    pub product: Product,
    /// Фактически изменённые поля (пусто для no-op обновления)
    pub changes: Vec<FieldChange>,
    /// false — товар сохранён, но запись в историю цен не удалась
    pub price_history_recorded: bool,
}
