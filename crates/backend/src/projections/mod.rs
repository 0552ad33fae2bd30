pub mod p900_price_history;
pub mod p901_audit_log;
