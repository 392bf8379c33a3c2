pub mod audit_store;
pub mod http_transport;

/// Re-export commonly used types from adapters
pub use audit_store::{MemoryAuditStore, SqliteAuditStore};
pub use http_transport::ReqwestTransport;
