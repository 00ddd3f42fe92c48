//! Property-Based Tests for Rate Limiting
//!
//! Uses proptest to check the fixed-window quota over arbitrary rules and paths.

use std::sync::Arc;

use proptest::prelude::*;

use crate::cache::CacheStore;
use crate::config::CacheConfig;
use crate::ratelimit::{ClientFingerprint, RateLimitConfig, RateLimitRule, RateLimiter, RouteClass};

fn path_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/api/auth/login".to_string()),
        Just("/api/admin/cache/clear".to_string()),
        Just("/api/products/optimized".to_string()),
        "/api/[a-z]{1,12}".prop_map(|s| s),
    ]
}

fn fingerprint_strategy() -> impl Strategy<Value = ClientFingerprint> {
    ("[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}", "[a-zA-Z/ .0-9]{0,40}")
        .prop_map(|(ip, ua)| ClientFingerprint::from_parts(Some(&ip), Some(&ua)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // A single client issuing exactly `max_requests` requests inside one window
    // is always admitted, and the next request is rejected with a positive retry.
    #[test]
    fn prop_quota_then_rejection(
        max_requests in 1u32..40,
        window_secs in 60u64..3600,
        path in path_strategy(),
        client in fingerprint_strategy(),
    ) {
        let cache = Arc::new(CacheStore::new(CacheConfig::disabled()));
        let rule = RateLimitRule::new(window_secs * 1000, max_requests);
        let limiter = RateLimiter::new(cache, RateLimitConfig::uniform(rule));

        tokio_test::block_on(async {
            for i in 0..max_requests {
                let decision = limiter.check(&path, &client).await;
                prop_assert!(decision.allowed, "request {} should be allowed", i + 1);
                prop_assert_eq!(decision.remaining, max_requests - i - 1);
            }

            let decision = limiter.check(&path, &client).await;
            prop_assert!(!decision.allowed);
            prop_assert!(decision.retry_after_secs > 0);
            prop_assert!(decision.retry_after_secs <= window_secs);
            Ok(())
        })?;
    }

    // Classification is total and consistent with the rule lookup.
    #[test]
    fn prop_every_path_has_a_rule(path in "/[a-z/_]{0,40}") {
        let class = RouteClass::classify(&path);
        let rule = RateLimitConfig::default().rule_for(class);
        prop_assert!(rule.max_requests > 0);
        prop_assert!(rule.window_ms > 0);
    }

    // The fingerprint is a pure function of its inputs.
    #[test]
    fn prop_fingerprint_deterministic(ip in "[0-9.]{1,15}", ua in ".{0,60}") {
        let a = ClientFingerprint::from_parts(Some(&ip), Some(&ua));
        let b = ClientFingerprint::from_parts(Some(&ip), Some(&ua));
        prop_assert_eq!(a, b);
    }
}
