//! Global admission limiting built atop `governor`.
//!
//! One [`AdmissionLimiter`] is shared by every caller of a gateway instance
//! (not per-caller or per-trace). It wraps a non-keyed token bucket: tokens
//! accumulate up to `capacity` at `refill_tokens` per `refill_interval_ms`
//! and admission never blocks: a call that finds no token is rejected
//! immediately and consumes nothing. The check is a single lock-free GCRA
//! operation inside `governor`.
use std::{num::NonZeroU32, time::Duration};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};

use crate::config::models::RateLimitConfig;

type DirectRateLimiterImpl = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Process-wide token bucket gate consulted once per incoming call.
pub struct AdmissionLimiter {
    limiter: DirectRateLimiterImpl,
}

impl AdmissionLimiter {
    /// Build a limiter from a [`RateLimitConfig`] definition.
    pub fn new(config: &RateLimitConfig) -> Result<Self, String> {
        let capacity = NonZeroU32::new(config.capacity)
            .ok_or_else(|| "Rate limit 'capacity' must be greater than 0".to_string())?;
        let refill_tokens = NonZeroU32::new(config.refill_tokens)
            .ok_or_else(|| "Rate limit 'refill_tokens' must be greater than 0".to_string())?;

        // One token replenishes every interval/refill_tokens.
        let token_period = Duration::from_millis(config.refill_interval_ms) / refill_tokens.get();
        if token_period.is_zero() {
            return Err(format!(
                "Rate limit refill period is zero: {} tokens per {}ms",
                config.refill_tokens, config.refill_interval_ms
            ));
        }

        let quota = Quota::with_period(token_period)
            .ok_or_else(|| format!("Invalid refill period: {token_period:?}"))?
            .allow_burst(capacity);

        tracing::info!(
            capacity = config.capacity,
            refill_tokens = config.refill_tokens,
            refill_interval_ms = config.refill_interval_ms,
            "Creating admission limiter"
        );

        Ok(Self {
            limiter: RateLimiter::direct(quota),
        })
    }

    /// Try to take one token. Non-blocking; `false` means the call must be
    /// rejected as a terminal "service busy" outcome.
    pub fn try_admit(&self) -> bool {
        self.limiter.check().is_ok()
    }
}
