use async_trait::async_trait;
use thiserror::Error;

use crate::core::audit::CallAttemptRecord;

/// Custom error type for audit persistence operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AuditStoreError {
    /// The store could not be reached or opened.
    #[error("Audit store unavailable: {0}")]
    Unavailable(String),

    /// The insert itself failed (constraint violation, I/O error, ...).
    #[error("Audit insert failed: {0}")]
    InsertFailed(String),
}

/// Result type alias for audit store operations.
pub type AuditStoreResult<T> = Result<T, AuditStoreError>;

/// AuditStore defines the port (interface) for the durable append-only
/// audit trail. Insert-only: records are never updated or deleted by this
/// crate; retention is an external concern.
#[async_trait]
pub trait AuditStore: Send + Sync + 'static {
    /// Append one attempt record.
    async fn insert(&self, record: &CallAttemptRecord) -> AuditStoreResult<()>;
}
