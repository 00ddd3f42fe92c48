//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.
//! Everything is resolved once at startup and passed down explicitly.

use std::env;
use std::time::Duration;

use crate::ratelimit::RateLimitConfig;

/// Backend URL assumed in development when `REDIS_URL` is unset.
const DEV_BACKEND_URL: &str = "redis://localhost:6379";

// == Cache Config ==
/// Settings for the cache backend connection.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Backend connection URL; `None` means fallback only
    pub backend_url: Option<String>,
    /// Password overriding any embedded in the URL
    pub password: Option<String>,
    /// `false` disables the backend entirely (CI dummy mode)
    pub enabled: bool,
    /// Bound on the one-time startup connection attempt
    pub connect_timeout: Duration,
}

impl CacheConfig {
    /// A configuration that never touches a backend.
    pub fn disabled() -> Self {
        Self {
            backend_url: None,
            password: None,
            enabled: false,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Fallback store sweep interval in seconds
    pub cleanup_interval: u64,
    /// Deployment environment name (`development`, `production`, ...)
    pub environment: String,
    /// Version reported by the health endpoint
    pub version: String,
    /// Optional JSON file seeding the product catalog
    pub catalog_path: Option<String>,
    /// Cache backend settings
    pub cache: CacheConfig,
    /// Per-route-class request quotas
    pub rate_limits: RateLimitConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Fallback sweep frequency in seconds (default: 30)
    /// - `APP_ENV` / `NODE_ENV` - Environment name (default: production)
    /// - `APP_VERSION` - Reported version (default: crate version)
    /// - `CATALOG_PATH` - Product seed file (default: none)
    /// - `REDIS_URL` / `REDIS_PASSWORD` - Cache backend (default: none, or localhost in development)
    /// - `CI_DUMMY_ENV` - `1` or `true` disables the cache backend
    /// - `CACHE_CONNECT_TIMEOUT` - Backend connect timeout in seconds (default: 5)
    pub fn from_env() -> Self {
        let environment = env::var("APP_ENV")
            .or_else(|_| env::var("NODE_ENV"))
            .unwrap_or_else(|_| "production".to_string());

        let ci_dummy = env::var("CI_DUMMY_ENV")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let backend_url = env::var("REDIS_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| (environment == "development").then(|| DEV_BACKEND_URL.to_string()));

        Self {
            server_port: parse_env("SERVER_PORT").unwrap_or(3000),
            cleanup_interval: parse_env("CLEANUP_INTERVAL").unwrap_or(30),
            version: env::var("APP_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            catalog_path: env::var("CATALOG_PATH").ok().filter(|v| !v.is_empty()),
            cache: CacheConfig {
                backend_url,
                password: env::var("REDIS_PASSWORD").ok().filter(|v| !v.is_empty()),
                enabled: !ci_dummy,
                connect_timeout: Duration::from_secs(
                    parse_env("CACHE_CONNECT_TIMEOUT").unwrap_or(5),
                ),
            },
            rate_limits: RateLimitConfig::default(),
            environment,
        }
    }

    /// Whether debug-level logging should be on by default.
    pub fn verbose_logging(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 30,
            environment: "production".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            catalog_path: None,
            cache: CacheConfig::disabled(),
            rate_limits: RateLimitConfig::default(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 30);
        assert!(!config.cache.enabled);
        assert!(!config.verbose_logging());
    }

    #[test]
    fn test_cache_config_disabled() {
        let config = CacheConfig::disabled();
        assert!(!config.enabled);
        assert!(config.backend_url.is_none());
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    // Every env-dependent assertion lives in one test so parallel tests never
    // observe each other's variables.
    #[test]
    fn test_config_from_env() {
        for var in [
            "SERVER_PORT",
            "CLEANUP_INTERVAL",
            "APP_ENV",
            "NODE_ENV",
            "REDIS_URL",
            "REDIS_PASSWORD",
            "CI_DUMMY_ENV",
            "CACHE_CONNECT_TIMEOUT",
            "CATALOG_PATH",
        ] {
            env::remove_var(var);
        }

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.environment, "production");
        assert!(config.cache.enabled);
        assert!(config.cache.backend_url.is_none());

        env::set_var("NODE_ENV", "development");
        let config = Config::from_env();
        assert!(config.verbose_logging());
        assert_eq!(config.cache.backend_url.as_deref(), Some(DEV_BACKEND_URL));

        env::set_var("REDIS_URL", "redis://cache.internal:6380");
        env::set_var("REDIS_PASSWORD", "whiskers");
        env::set_var("CACHE_CONNECT_TIMEOUT", "2");
        let config = Config::from_env();
        assert_eq!(
            config.cache.backend_url.as_deref(),
            Some("redis://cache.internal:6380")
        );
        assert_eq!(config.cache.password.as_deref(), Some("whiskers"));
        assert_eq!(config.cache.connect_timeout, Duration::from_secs(2));

        env::set_var("CI_DUMMY_ENV", "true");
        assert!(!Config::from_env().cache.enabled);
        env::set_var("CI_DUMMY_ENV", "1");
        assert!(!Config::from_env().cache.enabled);

        for var in [
            "NODE_ENV",
            "REDIS_URL",
            "REDIS_PASSWORD",
            "CI_DUMMY_ENV",
            "CACHE_CONNECT_TIMEOUT",
        ] {
            env::remove_var(var);
        }
    }
}
