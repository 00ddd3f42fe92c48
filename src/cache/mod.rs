//! Cache Module
//!
//! Backend-preferred key/value cache with a process-local fallback, plus
//! prefix-based invalidation.

mod backend;
mod entry;
mod fallback;
mod invalidation;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use backend::{CacheBackend, RedisBackend};
pub use entry::{current_timestamp_ms, CacheEntry};
pub use fallback::FallbackStore;
pub use invalidation::{CacheInvalidator, CacheKeys, CacheTtl};
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use store::{CacheStore, ConnectionState};
