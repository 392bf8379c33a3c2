//! Lexgate - a resilient, audited gateway client for a signed dictionary API.
//!
//! Lexgate fronts a third-party dictionary lookup service with a **hexagonal
//! architecture**: the core enforces a global call budget, signs every
//! outbound request with an HMAC-SHA1 scheme, retries transient upstream
//! failures with bounded exponential backoff, and records a durable,
//! best-effort audit trail of every attempt.
//!
//! # Features
//! - Canonical HMAC-SHA1 request signing with reproducible percent-encoding
//! - Global token-bucket admission control (via `governor`), checked once per
//!   call and never per retry
//! - Explicit retry policy: exponential backoff, capped delay, bounded
//!   attempts; 5xx and transport timeouts retry, everything else fails fast
//! - One append-only audit row per attempt, failure-isolated from the call
//! - Task-scoped correlation context with structural cleanup on every exit
//!   path
//! - Ergonomic configuration (TOML/YAML/JSON) with validation
//!
//! # Quick Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use lexgate::{
//!     adapters::{ReqwestTransport, SqliteAuditStore},
//!     core::{AdmissionLimiter, DictGatewayClient, DictQuery, RetryPolicy},
//! };
//!
//! # #[tokio::main] async fn main() -> eyre::Result<()> {
//! let cfg = lexgate::config::load_config("config.toml")?;
//! let transport = Arc::new(ReqwestTransport::new(&cfg.transport)?);
//! let store = Arc::new(SqliteAuditStore::connect(&cfg.audit.database_url).await?);
//! let limiter = AdmissionLimiter::new(&cfg.rate_limit).map_err(|e| eyre::eyre!(e))?;
//! let client = DictGatewayClient::new(
//!     cfg.upstream.clone(),
//!     RetryPolicy::from(&cfg.retry),
//!     limiter,
//!     transport,
//!     store,
//! );
//!
//! let body = client
//!     .query(&DictQuery::new(1, 20, "color"), None, None)
//!     .await?;
//! println!("{body}");
//! # Ok(()) }
//! ```
//!
//! # Architecture
//! The crate separates **ports** (traits) from **adapters** (implementations)
//! while keeping business logic inside `core`. End users should prefer the
//! re-exports documented below instead of reaching into internal modules
//! directly.
// Re-export public modules with explicit visibility controls
pub mod config;
pub mod ports;
pub mod tracing_setup;

// These modules are implementation details and should not be directly used by users
pub mod adapters;
pub mod core;

// Re-export the specific types needed by the binary crate
pub use crate::{
    adapters::{MemoryAuditStore, ReqwestTransport, SqliteAuditStore},
    core::{
        AdmissionLimiter, CallAttemptRecord, CallAuditRecorder, Classification,
        CorrelationContext, DictGatewayClient, DictQuery, GatewayError, RetryPolicy,
    },
    ports::{AuditStore, HttpTransport},
};
