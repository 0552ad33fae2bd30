pub mod aggregate;

pub use aggregate::{AdjustmentType, InventoryAdjustment, InventoryAdjustmentId};
