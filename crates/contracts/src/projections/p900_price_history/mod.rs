pub mod dto;

pub use dto::{PriceHistoryEntry, PriceHistoryListRequest, PriceHistoryListResponse};
