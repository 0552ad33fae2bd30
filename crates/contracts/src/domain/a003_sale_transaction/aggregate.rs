use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор чека продажи
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SaleTransactionId(pub Uuid);

impl SaleTransactionId {
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

impl AggregateId for SaleTransactionId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(SaleTransactionId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Способ оплаты
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Other,
}

impl PaymentMethod {
    /// Получить код способа оплаты
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Other => "other",
        }
    }

    /// Получить человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Наличные",
            PaymentMethod::Card => "Карта",
            PaymentMethod::Other => "Прочее",
        }
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            "other" => Some(PaymentMethod::Other),
            _ => None,
        }
    }
}

// ============================================================================
// Line Items
// ============================================================================

/// Строка чека — снимок цены и себестоимости на момент продажи
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    /// ID товара каталога (None для внекаталожных позиций)
    #[serde(rename = "productId")]
    pub product_id: Option<String>,

    /// Штрихкод товара
    pub upc: String,

    /// Название товара на момент продажи
    pub name: String,

    /// Цена на момент продажи
    #[serde(rename = "priceAtSale")]
    pub price_at_sale: f64,

    /// Себестоимость на момент продажи
    #[serde(rename = "costAtSale")]
    pub cost_at_sale: f64,

    /// Количество (отрицательное — возврат)
    pub quantity: i64,

    /// Сумма строки (цена × количество)
    #[serde(rename = "lineSubtotal")]
    pub line_subtotal: f64,
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Чек продажи (документ)
///
/// base.code содержит номер чека формата `TXN-YYYYMMDD-XXXXXX`.
/// Строки и суммы неизменяемы после записи.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleTransaction {
    #[serde(flatten)]
    pub base: BaseAggregate<SaleTransactionId>,

    /// ID магазина (ссылка на a001_store)
    #[serde(rename = "storeId")]
    pub store_id: String,

    /// Строки чека (порядок сохраняется)
    pub lines: Vec<SaleLine>,

    /// Сумма по строкам
    pub subtotal: f64,

    /// Налог
    pub tax: f64,

    /// Итого (subtotal + tax)
    pub total: f64,

    /// Способ оплаты
    #[serde(rename = "paymentMethod")]
    pub payment_method: PaymentMethod,

    /// Принято наличными (только для оплаты наличными)
    #[serde(rename = "cashGiven")]
    pub cash_given: Option<f64>,

    /// Сдача (только для оплаты наличными)
    #[serde(rename = "changeGiven")]
    pub change_given: Option<f64>,

    /// Ключ идемпотентности (уникален в пределах магазина)
    #[serde(rename = "idempotencyKey")]
    pub idempotency_key: Option<String>,

    /// ID кассира
    #[serde(rename = "actorId")]
    pub actor_id: Option<String>,
}

impl SaleTransaction {
    /// Создать новый чек для вставки в БД
    #[allow(clippy::too_many_arguments)]
    pub fn new_for_insert(
        code: String,
        description: String,
        store_id: String,
        lines: Vec<SaleLine>,
        subtotal: f64,
        tax: f64,
        total: f64,
        payment_method: PaymentMethod,
        cash_given: Option<f64>,
        change_given: Option<f64>,
        idempotency_key: Option<String>,
        actor_id: Option<String>,
        comment: Option<String>,
    ) -> Self {
        let mut base = BaseAggregate::new(SaleTransactionId::new_v4(), code, description);
        base.comment = comment;

        Self {
            base,
            store_id,
            lines,
            subtotal,
            tax,
            total,
            payment_method,
            cash_given,
            change_given,
            idempotency_key,
            actor_id,
        }
    }

    /// Получить ID как строку
    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Номер чека (бизнес-код документа)
    pub fn transaction_number(&self) -> &str {
        &self.base.code
    }

    /// Обновить timestamp
    pub fn touch_updated(&mut self) {
        self.base.touch();
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.base.code.trim().is_empty() {
            return Err("Номер чека не может быть пустым".into());
        }
        if self.store_id.trim().is_empty() {
            return Err("ID магазина не может быть пустым".into());
        }
        if self.lines.is_empty() {
            return Err("Чек не может быть пустым".into());
        }
        for line in &self.lines {
            if line.upc.trim().is_empty() {
                return Err("UPC строки не может быть пустым".into());
            }
            if line.quantity == 0 {
                return Err("Количество в строке не может быть нулевым".into());
            }
        }
        if self.payment_method == PaymentMethod::Cash && self.cash_given.is_none() {
            return Err("Для оплаты наличными требуется сумма внесённых наличных".into());
        }

        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.touch_updated();
    }
}

impl AggregateRoot for SaleTransaction {
    type Id = SaleTransactionId;

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
        "a003"
    }

    fn collection_name() -> &'static str {
        "sale_transaction"
    }
}
