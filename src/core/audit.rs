//! Per-attempt audit records and the failure-isolated recorder.
//!
//! Every dispatch attempt of a logical call produces exactly one
//! [`CallAttemptRecord`]; a rate-limited call produces a single record with
//! `attempt = 0` instead. Records are append-only; nothing in this crate
//! updates or deletes them. Persisting a record must never change the
//! outcome of the call being audited, so [`CallAuditRecorder::record`]
//! swallows store failures after logging them.
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::ports::audit_store::AuditStore;

/// Longest exception detail kept on a record; longer messages are truncated.
const MAX_DETAIL_CHARS: usize = 512;

/// Closed taxonomy of attempt-level failure classifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Rejected by the admission limiter before any network activity.
    RateLimited,
    /// Upstream returned a 5xx status. Retryable.
    Http5xx,
    /// Connection or read timeout, or other transport I/O failure. Retryable.
    Timeout,
    /// Any other failure, tagged by its concrete kind. Never retried.
    Other(String),
}

impl Classification {
    pub fn as_str(&self) -> &str {
        match self {
            Classification::RateLimited => "RATE_LIMITED",
            Classification::Http5xx => "HTTP_5XX",
            Classification::Timeout => "TIMEOUT",
            Classification::Other(kind) => kind,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row per dispatch attempt or pre-dispatch rejection.
///
/// `attempt` is 1-based and strictly increasing within a logical call;
/// 0 is reserved for rejections that never reached the transport (the
/// target URL is absent in that case). `duration_ms` measures the dispatch
/// call only; backoff sleeps between attempts are excluded.
#[derive(Debug, Clone)]
pub struct CallAttemptRecord {
    pub trace_id: String,
    /// Upstream-issued request identifier, when the response carried one.
    pub request_id: Option<String>,
    /// Constant per gateway instance.
    pub service: String,
    pub target_url: Option<String>,
    pub http_method: String,
    pub query_string: Option<String>,
    /// Absent when the attempt failed before a status was received.
    pub http_status: Option<u16>,
    pub success: bool,
    pub attempt: u32,
    pub duration_ms: u64,
    pub classification: Option<Classification>,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Persists attempt records without ever failing the audited call.
#[derive(Clone)]
pub struct CallAuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl CallAuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Persist one attempt record. Store failures are logged and discarded.
    pub async fn record(&self, mut record: CallAttemptRecord) {
        if let Some(detail) = record.detail.as_mut() {
            if detail.chars().count() > MAX_DETAIL_CHARS {
                *detail = detail.chars().take(MAX_DETAIL_CHARS).collect();
            }
        }

        if let Err(error) = self.store.insert(&record).await {
            tracing::warn!(
                error = %error,
                trace_id = %record.trace_id,
                attempt = record.attempt,
                "Failed to persist call audit record"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::ports::audit_store::{AuditStoreError, AuditStoreResult};

    struct FailingStore;

    #[async_trait]
    impl AuditStore for FailingStore {
        async fn insert(&self, _record: &CallAttemptRecord) -> AuditStoreResult<()> {
            Err(AuditStoreError::InsertFailed("disk full".to_string()))
        }
    }

    fn sample_record() -> CallAttemptRecord {
        CallAttemptRecord {
            trace_id: "trace-1".to_string(),
            request_id: None,
            service: "DICT_QUERY".to_string(),
            target_url: Some("http://localhost/api".to_string()),
            http_method: "GET".to_string(),
            query_string: Some("pageNum=1".to_string()),
            http_status: Some(200),
            success: true,
            attempt: 1,
            duration_ms: 12,
            classification: None,
            detail: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_recorder_swallows_store_failures() {
        let recorder = CallAuditRecorder::new(Arc::new(FailingStore));
        // Must complete without panicking or surfacing the error.
        recorder.record(sample_record()).await;
    }

    #[tokio::test]
    async fn test_recorder_truncates_long_detail() {
        use std::sync::Mutex;

        struct CapturingStore {
            rows: Mutex<Vec<CallAttemptRecord>>,
        }

        #[async_trait]
        impl AuditStore for CapturingStore {
            async fn insert(&self, record: &CallAttemptRecord) -> AuditStoreResult<()> {
                self.rows.lock().expect("rows lock").push(record.clone());
                Ok(())
            }
        }

        let store = Arc::new(CapturingStore {
            rows: Mutex::new(Vec::new()),
        });
        let recorder = CallAuditRecorder::new(store.clone());

        let mut record = sample_record();
        record.detail = Some("x".repeat(2000));
        recorder.record(record).await;

        let rows = store.rows.lock().expect("rows lock");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].detail.as_ref().map(String::len), Some(512));
    }

    #[test]
    fn test_classification_tags() {
        assert_eq!(Classification::RateLimited.as_str(), "RATE_LIMITED");
        assert_eq!(Classification::Http5xx.as_str(), "HTTP_5XX");
        assert_eq!(Classification::Timeout.as_str(), "TIMEOUT");
        assert_eq!(
            Classification::Other("HTTP_CLIENT_ERROR".to_string()).as_str(),
            "HTTP_CLIENT_ERROR"
        );
    }
}
