//! Retrying, audited dictionary gateway client.
//!
//! `DictGatewayClient` orchestrates one logical call end to end: it binds a
//! correlation scope, consults the global admission limiter, then drives an
//! explicit dispatch loop (sign, send, measure, audit, classify) until the
//! call succeeds, a terminal failure surfaces, or the retry budget is
//! exhausted. Every attempt writes exactly one audit row synchronously
//! before the next state transition is decided; a rate-limit rejection
//! writes a single row with `attempt = 0` and never reaches the transport.
use std::{sync::Arc, time::Instant};

use chrono::Utc;
use thiserror::Error;
use tracing::Instrument;

use crate::{
    config::models::UpstreamConfig,
    core::{
        audit::{CallAttemptRecord, CallAuditRecorder, Classification},
        correlation::{self, CorrelationContext},
        rate_limiter::AdmissionLimiter,
        retry::RetryPolicy,
        signature,
    },
    ports::{
        audit_store::AuditStore,
        http_transport::{HttpTransport, TransportError},
    },
};

/// Service tag stamped on every audit row written by this client.
pub const SERVICE_NAME: &str = "DICT_QUERY";
/// Fixed upstream path for dictionary lookups.
pub const DICT_QUERY_PATH: &str = "/api/v1/dataapi/execute/dict/query";

const HEADER_APP_KEY: &str = "AppKey";
const HEADER_SIGNATURE: &str = "Signature";
const HEADER_TIMESTAMP: &str = "Timestamp";

/// Classification tag for terminal 4xx-class upstream responses.
const KIND_HTTP_CLIENT_ERROR: &str = "HTTP_CLIENT_ERROR";

/// A validated dictionary lookup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictQuery {
    /// 1-based page number.
    pub page_num: u32,
    /// Page size, 1..=100.
    pub page_size: u32,
    /// Dictionary type selector, non-empty, at most 50 characters.
    pub dict_type: String,
}

impl DictQuery {
    pub fn new(page_num: u32, page_size: u32, dict_type: impl Into<String>) -> Self {
        Self {
            page_num,
            page_size,
            dict_type: dict_type.into(),
        }
    }

    /// Check the query against the upstream's documented bounds.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.page_num < 1 {
            return Err(GatewayError::InvalidQuery(
                "pageNum must be at least 1".to_string(),
            ));
        }
        if !(1..=100).contains(&self.page_size) {
            return Err(GatewayError::InvalidQuery(
                "pageSize must be within 1..=100".to_string(),
            ));
        }
        if self.dict_type.trim().is_empty() {
            return Err(GatewayError::InvalidQuery(
                "dictType must not be blank".to_string(),
            ));
        }
        if self.dict_type.chars().count() > 50 {
            return Err(GatewayError::InvalidQuery(
                "dictType must be at most 50 characters".to_string(),
            ));
        }
        Ok(())
    }

    /// Query parameters in wire order: `pageNum&pageSize&dictType`.
    fn to_params(&self) -> Vec<(String, String)> {
        vec![
            ("pageNum".to_string(), self.page_num.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
            ("dictType".to_string(), self.dict_type.clone()),
        ]
    }
}

/// Terminal errors surfaced to the caller of a dictionary query.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The query failed local validation; nothing was dispatched or audited.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Rejected by the admission limiter before any network activity.
    #[error("Service busy: call was rejected by the rate limiter")]
    RateLimited,

    /// Upstream answered with a 4xx-class status. Never retried.
    #[error("Upstream rejected the request with status {status}")]
    UpstreamClientError { status: u16 },

    /// Upstream kept answering 5xx until the retry budget ran out.
    #[error("Upstream returned server error status {status} on attempt {attempt}")]
    UpstreamServerError { status: u16, attempt: u32 },

    /// The transport failed; terminal either immediately (non-transient) or
    /// after the retry budget ran out.
    #[error("Transport failure on attempt {attempt}: {source}")]
    Transport {
        attempt: u32,
        #[source]
        source: TransportError,
    },
}

/// Resilient client for the upstream dictionary lookup API.
///
/// Shared state across concurrent calls is limited to the admission limiter
/// and the transport's connection pool; everything else is per-call.
pub struct DictGatewayClient {
    upstream: UpstreamConfig,
    retry: RetryPolicy,
    limiter: AdmissionLimiter,
    transport: Arc<dyn HttpTransport>,
    recorder: CallAuditRecorder,
}

impl DictGatewayClient {
    pub fn new(
        upstream: UpstreamConfig,
        retry: RetryPolicy,
        limiter: AdmissionLimiter,
        transport: Arc<dyn HttpTransport>,
        audit_store: Arc<dyn AuditStore>,
    ) -> Self {
        Self {
            upstream,
            retry,
            limiter,
            transport,
            recorder: CallAuditRecorder::new(audit_store),
        }
    }

    /// Execute one logical dictionary query.
    ///
    /// On success the upstream response body is returned verbatim. The
    /// `subject_id` identifies the caller on whose behalf the query runs and
    /// is visible via `correlation::current_subject_id()` for the duration of
    /// the call. The correlation scope established here is torn down on every
    /// exit path; after this method returns, `correlation::current_trace_id()`
    /// on the same task yields `None` again.
    pub async fn query(
        &self,
        query: &DictQuery,
        trace_id: Option<String>,
        subject_id: Option<String>,
    ) -> Result<String, GatewayError> {
        query.validate()?;

        let context = CorrelationContext::bind(trace_id, subject_id);
        let trace_id = context.trace_id().to_string();
        let span = tracing::info_span!(
            "dict_query",
            trace_id = %trace_id,
            dict_type = %query.dict_type,
        );

        correlation::scope(
            context,
            self.admit_and_dispatch(query, &trace_id).instrument(span),
        )
        .await
    }

    /// Rate-limit gate plus the `Dispatching` loop of the call state machine.
    async fn admit_and_dispatch(
        &self,
        query: &DictQuery,
        trace_id: &str,
    ) -> Result<String, GatewayError> {
        let call_started = Instant::now();

        if !self.limiter.try_admit() {
            tracing::warn!("Dictionary query rejected by rate limiter");
            self.recorder
                .record(CallAttemptRecord {
                    trace_id: trace_id.to_string(),
                    request_id: None,
                    service: SERVICE_NAME.to_string(),
                    target_url: None,
                    http_method: "GET".to_string(),
                    query_string: None,
                    http_status: None,
                    success: false,
                    attempt: 0,
                    duration_ms: call_started.elapsed().as_millis() as u64,
                    classification: Some(Classification::RateLimited),
                    detail: Some("rate limit exceeded".to_string()),
                    created_at: Utc::now(),
                })
                .await;
            return Err(GatewayError::RateLimited);
        }

        let params = query.to_params();
        let query_string = encode_query_string(&params);
        let target_url = format!(
            "{}{}?{}",
            self.upstream.base_url.trim_end_matches('/'),
            DICT_QUERY_PATH,
            query_string
        );

        let mut attempt = 0u32;
        loop {
            attempt += 1;

            let timestamp = signature::generate_timestamp();
            let sig = signature::sign(
                "GET",
                DICT_QUERY_PATH,
                &params,
                &self.upstream.app_key,
                &self.upstream.app_secret,
                &timestamp,
            );
            let headers = [
                (HEADER_APP_KEY, self.upstream.app_key.clone()),
                (HEADER_SIGNATURE, sig),
                (HEADER_TIMESTAMP, timestamp),
            ];

            // Duration covers the dispatch call only; backoff sleeps between
            // attempts are excluded.
            let dispatch_started = Instant::now();
            let outcome = self.transport.get(&target_url, &headers).await;
            let duration_ms = dispatch_started.elapsed().as_millis() as u64;

            let mut record = CallAttemptRecord {
                trace_id: trace_id.to_string(),
                request_id: None,
                service: SERVICE_NAME.to_string(),
                target_url: Some(target_url.clone()),
                http_method: "GET".to_string(),
                query_string: Some(query_string.clone()),
                http_status: None,
                success: false,
                attempt,
                duration_ms,
                classification: None,
                detail: None,
                created_at: Utc::now(),
            };

            match outcome {
                Ok(response) if response.is_success() => {
                    record.http_status = Some(response.status);
                    record.request_id = response.request_id.clone();
                    record.success = true;
                    self.recorder.record(record).await;
                    tracing::info!(
                        attempt,
                        status = response.status,
                        duration_ms,
                        "Dictionary query succeeded"
                    );
                    return Ok(response.body);
                }
                Ok(response) if response.is_server_error() => {
                    record.http_status = Some(response.status);
                    record.request_id = response.request_id.clone();
                    record.classification = Some(Classification::Http5xx);
                    record.detail = Some(format!("upstream returned status {}", response.status));
                    self.recorder.record(record).await;

                    if self.retry.should_retry(attempt) {
                        tracing::warn!(
                            attempt,
                            status = response.status,
                            "Upstream server error, retrying"
                        );
                        self.backoff(attempt).await;
                        continue;
                    }
                    tracing::error!(
                        attempt,
                        status = response.status,
                        "Upstream server error, retry budget exhausted"
                    );
                    return Err(GatewayError::UpstreamServerError {
                        status: response.status,
                        attempt,
                    });
                }
                Ok(response) => {
                    // 4xx and other non-success statuses are caller defects,
                    // never retried.
                    record.http_status = Some(response.status);
                    record.request_id = response.request_id.clone();
                    record.classification =
                        Some(Classification::Other(KIND_HTTP_CLIENT_ERROR.to_string()));
                    record.detail = Some(format!("upstream returned status {}", response.status));
                    self.recorder.record(record).await;
                    tracing::error!(
                        attempt,
                        status = response.status,
                        "Upstream rejected the request"
                    );
                    return Err(GatewayError::UpstreamClientError {
                        status: response.status,
                    });
                }
                Err(error) if error.is_transient() => {
                    record.classification = Some(Classification::Timeout);
                    record.detail = Some(error.to_string());
                    self.recorder.record(record).await;

                    if self.retry.should_retry(attempt) {
                        tracing::warn!(attempt, error = %error, "Transient transport failure, retrying");
                        self.backoff(attempt).await;
                        continue;
                    }
                    tracing::error!(attempt, error = %error, "Transport failure, retry budget exhausted");
                    return Err(GatewayError::Transport {
                        attempt,
                        source: error,
                    });
                }
                Err(error) => {
                    record.classification =
                        Some(Classification::Other(error.kind().to_string()));
                    record.detail = Some(error.to_string());
                    self.recorder.record(record).await;
                    tracing::error!(attempt, error = %error, "Non-retryable transport failure");
                    return Err(GatewayError::Transport {
                        attempt,
                        source: error,
                    });
                }
            }
        }
    }

    async fn backoff(&self, attempt: u32) {
        let delay = self.retry.delay_after_attempt(attempt);
        tracing::debug!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Backing off before retry"
        );
        tokio::time::sleep(delay).await;
    }
}

/// Percent-encode `key=value` pairs in their given order, joined with `&`.
fn encode_query_string(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_validation_bounds() {
        assert!(DictQuery::new(1, 1, "color").validate().is_ok());
        assert!(DictQuery::new(1, 100, "color").validate().is_ok());

        assert!(DictQuery::new(0, 20, "color").validate().is_err());
        assert!(DictQuery::new(1, 0, "color").validate().is_err());
        assert!(DictQuery::new(1, 101, "color").validate().is_err());
        assert!(DictQuery::new(1, 20, "   ").validate().is_err());
        assert!(DictQuery::new(1, 20, "x".repeat(51)).validate().is_err());
        assert!(DictQuery::new(1, 20, "x".repeat(50)).validate().is_ok());
    }

    #[test]
    fn test_query_string_order_and_encoding() {
        let query = DictQuery::new(2, 50, "status type");
        let query_string = encode_query_string(&query.to_params());
        assert_eq!(query_string, "pageNum=2&pageSize=50&dictType=status%20type");
    }
}
