use thiserror::Error;

/// Ошибки движка транзакций
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Product not found: upc {upc} in store {store_id}")]
    ProductNotFound { store_id: String, upc: String },

    #[error("Duplicate UPC {upc} in store {store_id}")]
    DuplicateUpc { store_id: String, upc: String },

    #[error("Negative inventory for upc {upc}: current {current}, requested change {requested}")]
    NegativeInventory {
        upc: String,
        current: i64,
        requested: i64,
    },

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl EngineError {
    /// Ошибка валидации запроса
    pub fn invalid(msg: impl Into<String>) -> Self {
        EngineError::InvalidRequest(msg.into())
    }

    /// Ошибка хранилища
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        EngineError::Persistence(err.to_string())
    }
}
