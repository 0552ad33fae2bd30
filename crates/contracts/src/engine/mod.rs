//! Контракты движка транзакций: запросы, результаты, ошибки

pub mod adjustment;
pub mod catalog;
pub mod error;
pub mod sale;

pub use adjustment::{AdjustmentRequest, ReconcileRequest};
pub use catalog::{ProductCreate, ProductUpdate, UpdatedProduct};
pub use error::EngineError;
pub use sale::{
    is_off_catalog_upc, InventoryWarning, SaleLineRequest, SaleOutcome, SaleRequest,
    OFF_CATALOG_UPC_PREFIXES,
};
