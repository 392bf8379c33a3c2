use std::{str::FromStr, sync::Mutex};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::{
    core::audit::CallAttemptRecord,
    ports::audit_store::{AuditStore, AuditStoreError, AuditStoreResult},
};

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS external_call_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    trace_id TEXT NOT NULL,
    request_id TEXT,
    service TEXT NOT NULL,
    target_url TEXT,
    http_method TEXT NOT NULL,
    query_string TEXT,
    http_status INTEGER,
    success INTEGER NOT NULL,
    attempt INTEGER NOT NULL,
    duration_ms INTEGER NOT NULL,
    exception_type TEXT,
    exception_message TEXT,
    created_at TEXT NOT NULL
)
"#;

const INSERT_SQL: &str = r#"
INSERT INTO external_call_log (
    trace_id, request_id, service, target_url, http_method, query_string,
    http_status, success, attempt, duration_ms, exception_type,
    exception_message, created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
"#;

/// Durable audit sink backed by a single SQLite table.
///
/// The table is created on connect if missing. Writes are plain inserts;
/// this adapter never updates or deletes rows.
pub struct SqliteAuditStore {
    pool: SqlitePool,
}

impl SqliteAuditStore {
    /// Open (and if necessary create) the audit database.
    pub async fn connect(database_url: &str) -> AuditStoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AuditStoreError::Unavailable(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AuditStoreError::Unavailable(e.to_string()))?;

        sqlx::query(CREATE_TABLE_SQL)
            .execute(&pool)
            .await
            .map_err(|e| AuditStoreError::Unavailable(e.to_string()))?;

        tracing::info!(database_url, "Opened audit store");
        Ok(Self { pool })
    }
}

#[async_trait]
impl AuditStore for SqliteAuditStore {
    async fn insert(&self, record: &CallAttemptRecord) -> AuditStoreResult<()> {
        sqlx::query(INSERT_SQL)
            .bind(&record.trace_id)
            .bind(&record.request_id)
            .bind(&record.service)
            .bind(&record.target_url)
            .bind(&record.http_method)
            .bind(&record.query_string)
            .bind(record.http_status.map(i64::from))
            .bind(record.success)
            .bind(i64::from(record.attempt))
            .bind(record.duration_ms as i64)
            .bind(record.classification.as_ref().map(|c| c.to_string()))
            .bind(&record.detail)
            .bind(record.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AuditStoreError::InsertFailed(e.to_string()))?;
        Ok(())
    }
}

/// In-memory audit sink for tests and ephemeral embedding.
#[derive(Default)]
pub struct MemoryAuditStore {
    rows: Mutex<Vec<CallAttemptRecord>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded rows, in insertion order.
    pub fn rows(&self) -> Vec<CallAttemptRecord> {
        self.rows.lock().expect("audit rows lock poisoned").clone()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn insert(&self, record: &CallAttemptRecord) -> AuditStoreResult<()> {
        self.rows
            .lock()
            .expect("audit rows lock poisoned")
            .push(record.clone());
        Ok(())
    }
}
