//! Fixed-Window Rate Limiter
//!
//! Counts requests per client and route class in the cache store.
//!
//! The read-modify-write below is not atomic: two requests racing on the same
//! window can both be admitted one over the limit. This is a soft limit.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::{current_timestamp_ms, CacheStore};
use crate::ratelimit::{ClientFingerprint, LimitedAction, RateLimitConfig, RateLimitRule, RouteClass};

/// Key prefix for route-class windows.
pub const RATE_LIMIT_PREFIX: &str = "rate_limit:";
/// Key prefix for per-action windows.
pub const ACTION_RATE_LIMIT_PREFIX: &str = "action_limit:";

// == Rate Window ==
/// Stored counter for one client in one route class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWindow {
    pub count: u32,
    #[serde(rename = "resetTime")]
    pub reset_at_ms: i64,
}

impl RateWindow {
    fn fresh(now_ms: i64, rule: RateLimitRule) -> Self {
        Self {
            count: 1,
            reset_at_ms: now_ms + rule.window_ms as i64,
        }
    }

    fn is_over(&self, now_ms: i64) -> bool {
        now_ms > self.reset_at_ms
    }

    /// Seconds until reset, rounded up, never below 1.
    fn seconds_left(&self, now_ms: i64) -> u64 {
        let remaining = (self.reset_at_ms - now_ms).max(0) as u64;
        remaining.div_ceil(1000).max(1)
    }
}

// == Rate Decision ==
/// Outcome of a rate-limit check, with everything needed for response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Window reset, Unix milliseconds
    pub reset_at_ms: i64,
    /// Seconds until the window resets
    pub retry_after_secs: u64,
}

impl RateDecision {
    fn from_window(window: RateWindow, rule: RateLimitRule, allowed: bool, now_ms: i64) -> Self {
        Self {
            allowed,
            limit: rule.max_requests,
            remaining: rule.max_requests.saturating_sub(window.count),
            reset_at_ms: window.reset_at_ms,
            retry_after_secs: window.seconds_left(now_ms),
        }
    }

    /// Allowing decision used when the limiter itself cannot do its job.
    fn fail_open(rule: RateLimitRule, now_ms: i64) -> Self {
        Self {
            allowed: true,
            limit: rule.max_requests,
            remaining: rule.max_requests,
            reset_at_ms: now_ms + rule.window_ms as i64,
            retry_after_secs: 0,
        }
    }
}

// == Rate Limit Stats ==
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStats {
    pub total_keys: usize,
    pub api_rate_limits: usize,
    pub custom_rate_limits: usize,
}

// == Rate Limiter ==
#[derive(Debug, Clone)]
pub struct RateLimiter {
    cache: Arc<CacheStore>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(cache: Arc<CacheStore>, config: RateLimitConfig) -> Self {
        Self { cache, config }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    // == Check ==
    /// Records one request to `path` from `client` and decides whether to admit it.
    ///
    /// The count is incremented first; the request is rejected once the count
    /// exceeds the route class quota. Internal failures admit the request.
    pub async fn check(&self, path: &str, client: &ClientFingerprint) -> RateDecision {
        let class = RouteClass::classify(path);
        let rule = self.config.rule_for(class);
        let key = format!("{}{}:{}", RATE_LIMIT_PREFIX, class.as_str(), client);
        let now = current_timestamp_ms();

        let window = match self.cache.get_json::<RateWindow>(&key).await {
            Some(window) if !window.is_over(now) => RateWindow {
                count: window.count.saturating_add(1),
                ..window
            },
            _ => RateWindow::fresh(now, rule),
        };

        if let Err(e) = self
            .cache
            .set_json(&key, &window, window.seconds_left(now))
            .await
        {
            warn!(key = %key, error = %e, "Rate limiter failed to store window, allowing request");
            return RateDecision::fail_open(rule, now);
        }

        let allowed = window.count <= rule.max_requests;
        if !allowed {
            debug!(class = class.as_str(), count = window.count, "Rate limit exceeded");
        }
        RateDecision::from_window(window, rule, allowed, now)
    }

    // == Check Action ==
    /// Checks a sensitive action against its own quota.
    ///
    /// Unlike [`check`](Self::check), a rejected attempt is not counted.
    pub async fn check_action(&self, action: LimitedAction, client: &ClientFingerprint) -> RateDecision {
        let rule = action.rule();
        let key = format!("{}{}:{}", ACTION_RATE_LIMIT_PREFIX, action.as_str(), client);
        let now = current_timestamp_ms();

        let window = match self.cache.get_json::<RateWindow>(&key).await {
            Some(window) if !window.is_over(now) => {
                if window.count >= rule.max_requests {
                    debug!(action = action.as_str(), "Action rate limit exceeded");
                    return RateDecision::from_window(window, rule, false, now);
                }
                RateWindow {
                    count: window.count + 1,
                    ..window
                }
            }
            _ => RateWindow::fresh(now, rule),
        };

        if let Err(e) = self
            .cache
            .set_json(&key, &window, window.seconds_left(now))
            .await
        {
            warn!(key = %key, error = %e, "Action limiter failed to store window, allowing request");
            return RateDecision::fail_open(rule, now);
        }

        RateDecision::from_window(window, rule, true, now)
    }

    // == Stats ==
    /// Counts live rate-limit windows.
    pub async fn stats(&self) -> RateLimitStats {
        let api_rate_limits = self.cache.keys(&format!("{RATE_LIMIT_PREFIX}*")).await.len();
        let custom_rate_limits = self
            .cache
            .keys(&format!("{ACTION_RATE_LIMIT_PREFIX}*"))
            .await
            .len();
        RateLimitStats {
            total_keys: api_rate_limits + custom_rate_limits,
            api_rate_limits,
            custom_rate_limits,
        }
    }
}
