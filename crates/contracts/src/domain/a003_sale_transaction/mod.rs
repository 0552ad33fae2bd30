pub mod aggregate;

pub use aggregate::{PaymentMethod, SaleLine, SaleTransaction, SaleTransactionId};
