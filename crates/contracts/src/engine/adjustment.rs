use crate::domain::a004_inventory_adjustment::AdjustmentType;
use serde::{Deserialize, Serialize};

/// Запрос на корректировку остатка (режим дельты)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    pub store_id: String,
    pub upc: String,
    pub adjustment_type: AdjustmentType,
    /// Изменение остатка (ненулевое; отрицательное — списание)
    pub quantity_change: i64,
    pub reason: String,
    #[serde(default)]
    pub actor_id: Option<String>,
    #[serde(default)]
    pub actor_name: Option<String>,
    /// Номер связанного чека (для возвратов)
    #[serde(default)]
    pub related_transaction: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Запрос на сверку остатка (абсолютный режим)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileRequest {
    pub store_id: String,
    pub upc: String,
    /// Фактически пересчитанный остаток (не меньше нуля)
    pub new_count: i64,
    /// Остаток по версии вызывающей стороны. Авторитетным остаётся
    /// значение, прочитанное движком внутри транзакции; расхождение
    /// фиксируется в примечаниях корректировки.
    #[serde(default)]
    pub previous_count: Option<i64>,
    pub reason: String,
    #[serde(default)]
    pub actor_id: Option<String>,
    #[serde(default)]
    pub actor_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}
