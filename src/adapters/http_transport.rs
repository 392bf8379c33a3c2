use std::time::Duration;

use async_trait::async_trait;
use eyre::{Context, Result};

use crate::{
    config::models::TransportConfig,
    ports::http_transport::{HttpTransport, TransportError, TransportResponse, TransportResult},
};

/// Response header carrying the upstream-issued request identifier.
const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// HTTP transport adapter using reqwest with rustls.
///
/// Responsibilities:
/// * Enforces the configured connect and read timeouts
/// * Buffers the response body and surfaces the status as data (never as an
///   error; classification belongs to the gateway)
/// * Extracts the upstream request id header when present
///
/// This adapter is intentionally minimal; rate limiting, signing and retries
/// live in the core and are layered on top of this port.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a new transport from the configured timeouts.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .user_agent("Lexgate/0.1")
            .build()
            .wrap_err("Failed to build reqwest client")?;

        tracing::info!(
            connect_timeout_ms = config.connect_timeout_ms,
            read_timeout_ms = config.read_timeout_ms,
            "Created upstream HTTP transport"
        );
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, String)],
    ) -> TransportResult<TransportResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        tracing::debug!(url, "Dispatching upstream request");

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await.map_err(map_reqwest_error)?;

        tracing::debug!(url, status, "Upstream response received");

        Ok(TransportResponse {
            status,
            request_id,
            body,
        })
    }
}

/// Map a reqwest failure onto the transport error taxonomy.
///
/// Timeouts and connectivity failures are transient; requests reqwest itself
/// refuses to build or send are not. Anything else (for example a connection
/// dropped while streaming the body) counts as an I/O failure and stays
/// retryable.
fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::Connection(error.to_string())
    } else if error.is_builder() || error.is_request() {
        TransportError::InvalidRequest(error.to_string())
    } else {
        TransportError::Connection(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        let transport = ReqwestTransport::new(&TransportConfig::default());
        assert!(transport.is_ok());
    }

    #[tokio::test]
    async fn test_connect_error_is_transient() {
        // Port 1 on localhost is almost certainly closed; a tiny connect
        // timeout keeps the test fast either way.
        let transport = ReqwestTransport::new(&TransportConfig {
            connect_timeout_ms: 200,
            read_timeout_ms: 500,
        })
        .unwrap();

        let result = transport.get("http://127.0.0.1:1/none", &[]).await;
        match result {
            Err(error) => assert!(error.is_transient(), "unexpected error: {error}"),
            Ok(response) => panic!("expected a transport failure, got status {}", response.status),
        }
    }
}
