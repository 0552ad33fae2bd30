pub mod a001_store;
pub mod a002_product;
pub mod a003_sale_transaction;
pub mod a004_inventory_adjustment;
