//! Configuration data structures for Lexgate.
//!
//! These types map directly to TOML (also JSON / YAML) configuration files.
//! They are intentionally serde-friendly and include defaults so that minimal
//! configs remain concise; only the upstream credentials have no defaults and
//! must always be supplied.
use serde::{Deserialize, Serialize};

/// Top-level gateway configuration.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    /// Upstream endpoint and signing credentials.
    pub upstream: UpstreamConfig,
    /// Outbound HTTP transport tuning.
    #[serde(default)]
    pub transport: TransportConfig,
    /// Global admission limiting.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Retry/backoff policy for transient upstream failures.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Audit trail persistence.
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Upstream service endpoint and shared-secret credentials.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the upstream service (scheme + authority).
    pub base_url: String,
    /// Application key sent in the `AppKey` header and signed over.
    pub app_key: String,
    /// Shared secret used as the HMAC signing key.
    pub app_secret: String,
}

/// Connect/read timeouts for the outbound HTTP client.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TransportConfig {
    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// End-to-end request timeout (covers reading the response) in milliseconds.
    pub read_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5000,
            read_timeout_ms: 10000,
        }
    }
}

/// Token bucket parameters shared by all callers of a gateway instance.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum burst (bucket capacity).
    pub capacity: u32,
    /// Tokens replenished per interval.
    pub refill_tokens: u32,
    /// Replenishment interval in milliseconds.
    pub refill_interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            refill_tokens: 10,
            refill_interval_ms: 1000,
        }
    }
}

/// Retry/backoff parameters consulted by the dispatch loop.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of dispatch attempts (1 = no retry).
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Multiplier applied per retry.
    pub multiplier: f64,
    /// Upper bound on any single backoff delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            multiplier: 2.0,
            max_delay_ms: 10000,
        }
    }
}

/// Audit trail persistence settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AuditConfig {
    /// SQLite connection string for the append-only call log.
    pub database_url: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://lexgate_audit.db".to_string(),
        }
    }
}
