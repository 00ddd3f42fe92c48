//! Rate Limit Rules
//!
//! Route classification and the quota attached to each route class.

use serde::Serialize;

const FIFTEEN_MINUTES_MS: u64 = 15 * 60 * 1000;
const ONE_HOUR_MS: u64 = 60 * 60 * 1000;

// == Rate Limit Rule ==
/// A fixed-window quota: at most `max_requests` per `window_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub window_ms: u64,
    pub max_requests: u32,
}

impl RateLimitRule {
    pub const fn new(window_ms: u64, max_requests: u32) -> Self {
        Self {
            window_ms,
            max_requests,
        }
    }
}

// == Route Class ==
/// Coarse category of an API route, used to pick its quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteClass {
    Auth,
    Admin,
    Public,
    Default,
}

impl RouteClass {
    /// Classifies a request path. First match wins: auth, admin, public.
    pub fn classify(path: &str) -> Self {
        if path.starts_with("/api/auth") || path.starts_with("/auth") {
            RouteClass::Auth
        } else if path.starts_with("/api/admin") {
            RouteClass::Admin
        } else if path.starts_with("/api/public")
            || path.contains("/products")
            || path.contains("/categories")
        {
            RouteClass::Public
        } else {
            RouteClass::Default
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::Auth => "auth",
            RouteClass::Admin => "admin",
            RouteClass::Public => "public",
            RouteClass::Default => "default",
        }
    }
}

/// Whether a path is subject to rate limiting at all.
///
/// Only API routes are limited, minus framework asset passthroughs.
pub fn is_rate_limited_path(path: &str) -> bool {
    path.starts_with("/api/")
        && !path.starts_with("/api/_next")
        && !path.starts_with("/api/static")
}

// == Rate Limit Config ==
/// Quota for each route class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub auth: RateLimitRule,
    pub admin: RateLimitRule,
    pub public: RateLimitRule,
    pub default: RateLimitRule,
}

impl RateLimitConfig {
    pub fn rule_for(&self, class: RouteClass) -> RateLimitRule {
        match class {
            RouteClass::Auth => self.auth,
            RouteClass::Admin => self.admin,
            RouteClass::Public => self.public,
            RouteClass::Default => self.default,
        }
    }

    /// Applies the same rule to every route class.
    pub fn uniform(rule: RateLimitRule) -> Self {
        Self {
            auth: rule,
            admin: rule,
            public: rule,
            default: rule,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth: RateLimitRule::new(FIFTEEN_MINUTES_MS, 20),
            admin: RateLimitRule::new(FIFTEEN_MINUTES_MS, 50),
            public: RateLimitRule::new(FIFTEEN_MINUTES_MS, 200),
            default: RateLimitRule::new(FIFTEEN_MINUTES_MS, 100),
        }
    }
}

// == Limited Actions ==
/// Sensitive operations with their own, tighter quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitedAction {
    PasswordReset,
    EmailVerification,
    ContactForm,
    Payment,
}

impl LimitedAction {
    pub fn rule(&self) -> RateLimitRule {
        match self {
            LimitedAction::PasswordReset => RateLimitRule::new(ONE_HOUR_MS, 3),
            LimitedAction::EmailVerification => RateLimitRule::new(FIFTEEN_MINUTES_MS, 5),
            LimitedAction::ContactForm => RateLimitRule::new(ONE_HOUR_MS, 10),
            LimitedAction::Payment => RateLimitRule::new(ONE_HOUR_MS, 20),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LimitedAction::PasswordReset => "password_reset",
            LimitedAction::EmailVerification => "email_verification",
            LimitedAction::ContactForm => "contact_form",
            LimitedAction::Payment => "payment",
        }
    }
}
