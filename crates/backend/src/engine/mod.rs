pub mod adjustment;
pub mod catalog;
pub mod numbering;
pub mod sale;
