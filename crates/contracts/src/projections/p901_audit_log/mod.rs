pub mod dto;

pub use dto::{
    ActionCode, AuditCategory, AuditEntry, AuditListRequest, AuditListResponse, AuditSeverity,
    FieldChange,
};
