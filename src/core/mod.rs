pub mod audit;
pub mod correlation;
pub mod gateway;
pub mod rate_limiter;
pub mod retry;
pub mod signature;

pub use audit::{CallAttemptRecord, CallAuditRecorder, Classification};
pub use correlation::CorrelationContext;
pub use gateway::{DictGatewayClient, DictQuery, GatewayError};
pub use rate_limiter::AdmissionLimiter;
pub use retry::RetryPolicy;
