use url::Url;

use crate::config::models::{
    GatewayConfig, RateLimitConfig, RetryConfig, TransportConfig, UpstreamConfig,
};

/// Validation result type alias
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, thiserror::Error, Clone)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

/// Gateway configuration validator
pub struct GatewayConfigValidator;

impl GatewayConfigValidator {
    /// Validate the entire gateway configuration
    pub fn validate(config: &GatewayConfig) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(mut upstream_errors) = Self::validate_upstream(&config.upstream) {
            errors.append(&mut upstream_errors);
        }
        if let Err(mut transport_errors) = Self::validate_transport(&config.transport) {
            errors.append(&mut transport_errors);
        }
        if let Err(mut rate_limit_errors) = Self::validate_rate_limit(&config.rate_limit) {
            errors.append(&mut rate_limit_errors);
        }
        if let Err(mut retry_errors) = Self::validate_retry(&config.retry) {
            errors.append(&mut retry_errors);
        }
        if config.audit.database_url.trim().is_empty() {
            errors.push(ValidationError::MissingField {
                field: "audit.database_url".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ValidationFailed {
                message: errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            })
        }
    }

    fn validate_upstream(upstream: &UpstreamConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if upstream.base_url.trim().is_empty() {
            errors.push(ValidationError::MissingField {
                field: "upstream.base_url".to_string(),
            });
        } else {
            match Url::parse(&upstream.base_url) {
                Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
                Ok(url) => errors.push(ValidationError::InvalidBaseUrl {
                    url: upstream.base_url.clone(),
                    reason: format!("unsupported scheme '{}'", url.scheme()),
                }),
                Err(e) => errors.push(ValidationError::InvalidBaseUrl {
                    url: upstream.base_url.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        if upstream.app_key.trim().is_empty() {
            errors.push(ValidationError::MissingField {
                field: "upstream.app_key".to_string(),
            });
        }
        if upstream.app_secret.trim().is_empty() {
            errors.push(ValidationError::MissingField {
                field: "upstream.app_secret".to_string(),
            });
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn validate_transport(transport: &TransportConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if transport.connect_timeout_ms == 0 {
            errors.push(ValidationError::InvalidField {
                field: "transport.connect_timeout_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if transport.read_timeout_ms == 0 {
            errors.push(ValidationError::InvalidField {
                field: "transport.read_timeout_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn validate_rate_limit(rate_limit: &RateLimitConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if rate_limit.capacity == 0 {
            errors.push(ValidationError::InvalidField {
                field: "rate_limit.capacity".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if rate_limit.refill_tokens == 0 {
            errors.push(ValidationError::InvalidField {
                field: "rate_limit.refill_tokens".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if rate_limit.refill_interval_ms == 0 {
            errors.push(ValidationError::InvalidField {
                field: "rate_limit.refill_interval_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn validate_retry(retry: &RetryConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if retry.max_attempts == 0 {
            errors.push(ValidationError::InvalidField {
                field: "retry.max_attempts".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if retry.multiplier < 1.0 {
            errors.push(ValidationError::InvalidField {
                field: "retry.multiplier".to_string(),
                message: "must be at least 1.0".to_string(),
            });
        }
        if retry.max_delay_ms < retry.initial_delay_ms {
            errors.push(ValidationError::InvalidField {
                field: "retry.max_delay_ms".to_string(),
                message: "must not be smaller than initial_delay_ms".to_string(),
            });
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::models::{AuditConfig, GatewayConfig};

    fn valid_config() -> GatewayConfig {
        GatewayConfig {
            upstream: UpstreamConfig {
                base_url: "http://127.0.0.1:18022".to_string(),
                app_key: "ak".to_string(),
                app_secret: "sk".to_string(),
            },
            transport: TransportConfig::default(),
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
            audit: AuditConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(GatewayConfigValidator::validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let mut config = valid_config();
        config.upstream.base_url = "not a url".to_string();
        assert!(GatewayConfigValidator::validate(&config).is_err());

        config.upstream.base_url = "ftp://example.com".to_string();
        assert!(GatewayConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let mut config = valid_config();
        config.upstream.app_secret = "  ".to_string();
        let result = GatewayConfigValidator::validate(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("app_secret"));
    }

    #[test]
    fn test_zero_rate_limit_fields_rejected() {
        let mut config = valid_config();
        config.rate_limit.capacity = 0;
        config.rate_limit.refill_interval_ms = 0;
        let message = GatewayConfigValidator::validate(&config)
            .unwrap_err()
            .to_string();
        assert!(message.contains("rate_limit.capacity"));
        assert!(message.contains("rate_limit.refill_interval_ms"));
    }

    #[test]
    fn test_retry_bounds_rejected() {
        let mut config = valid_config();
        config.retry.max_attempts = 0;
        config.retry.multiplier = 0.5;
        config.retry.max_delay_ms = 10;
        assert!(GatewayConfigValidator::validate(&config).is_err());
    }
}
