pub mod audit_store;
pub mod http_transport;

/// Re-export commonly used types from ports
pub use audit_store::{AuditStore, AuditStoreError, AuditStoreResult};
pub use http_transport::{HttpTransport, TransportError, TransportResponse, TransportResult};
