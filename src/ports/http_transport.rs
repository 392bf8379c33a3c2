use async_trait::async_trait;
use thiserror::Error;

/// Custom error type for outbound transport operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    /// Connection to the upstream could not be established or broke mid-flight.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The connect or read timeout elapsed before a response arrived.
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// The request could not be constructed or sent as given.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Whether the failure is eligible for automatic retry.
    ///
    /// Timeouts and connectivity failures are transient; a request the
    /// transport itself rejects is a programming or configuration defect.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransportError::Connection(_) | TransportError::Timeout(_)
        )
    }

    /// Stable tag naming the concrete failure kind, used for audit rows.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Connection(_) => "CONNECTION",
            TransportError::Timeout(_) => "TIMEOUT",
            TransportError::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }
}

/// Result type alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// A fully-buffered upstream response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Upstream-issued request identifier, when present.
    pub request_id: Option<String>,
    /// Response body, verbatim.
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// HttpTransport defines the port (interface) for dispatching signed
/// requests to the upstream service.
///
/// Implementations must enforce their configured connect/read timeouts and
/// surface non-2xx statuses as ordinary responses, not errors; status
/// classification belongs to the gateway, not the transport.
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    /// Perform an HTTP GET against the given absolute URL with the supplied
    /// headers attached.
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, String)],
    ) -> TransportResult<TransportResponse>;
}
