//! Cache Statistics Module
//!
//! Tracks cache lookups and backend failures for the health and admin endpoints.

use serde::Serialize;

use crate::cache::ConnectionState;

// == Cache Stats ==
/// Running counters maintained by the cache store.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Lookups that returned a value
    pub hits: u64,
    /// Lookups that found nothing (absent or expired)
    pub misses: u64,
    /// Backend calls that failed and were served by the fallback store
    pub backend_errors: u64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_backend_error(&mut self) {
        self.backend_errors += 1;
    }
}

// == Stats Snapshot ==
/// Point-in-time view of the store, as reported over HTTP.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsSnapshot {
    /// `redis` when the backend is connected, `fallback` otherwise
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub connected: bool,
    pub state: ConnectionState,
    pub hits: u64,
    pub misses: u64,
    pub backend_errors: u64,
    pub hit_rate: f64,
    /// Entries currently held by the process-local fallback map
    pub fallback_entries: usize,
}

impl CacheStatsSnapshot {
    pub fn new(state: ConnectionState, stats: &CacheStats, fallback_entries: usize) -> Self {
        let connected = state == ConnectionState::Connected;
        Self {
            kind: if connected { "redis" } else { "fallback" },
            connected,
            state,
            hits: stats.hits,
            misses: stats.misses,
            backend_errors: stats.backend_errors,
            hit_rate: stats.hit_rate(),
            fallback_entries,
        }
    }
}
