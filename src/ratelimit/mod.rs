//! Rate Limiting Module
//!
//! Fixed-window request quotas per client fingerprint and route class, stored
//! in the cache store so they are shared across processes when the backend is up.

mod fingerprint;
mod limiter;
mod rules;

#[cfg(test)]
mod property_tests;

pub use fingerprint::ClientFingerprint;
pub use limiter::{
    RateDecision, RateLimitStats, RateLimiter, RateWindow, ACTION_RATE_LIMIT_PREFIX,
    RATE_LIMIT_PREFIX,
};
pub use rules::{is_rate_limited_path, LimitedAction, RateLimitConfig, RateLimitRule, RouteClass};
