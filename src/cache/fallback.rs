//! Fallback Store Module
//!
//! Process-local map used whenever the cache backend is unreachable.

use std::collections::HashMap;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::CacheEntry;

// == Fallback Store ==
/// In-memory key/value map with lazy TTL expiry.
///
/// Expired entries are dropped when read and by [`cleanup_expired`](Self::cleanup_expired).
#[derive(Debug, Default)]
pub struct FallbackStore {
    entries: HashMap<String, CacheEntry>,
}

impl FallbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Returns the value for `key` if present and live, removing it if expired.
    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let now = current_timestamp_ms();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry and its TTL.
    pub fn set(&mut self, key: &str, value: Vec<u8>, ttl_seconds: u64) {
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl_seconds));
    }

    // == Delete ==
    /// Removes `key`. Returns whether an entry was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Keys ==
    /// Lists keys matching `pattern`.
    ///
    /// The `*` wildcard is stripped and the remainder is matched as a
    /// substring of each key.
    pub fn keys(&self, pattern: &str) -> Vec<String> {
        let needle = pattern.replace('*', "");
        let now = current_timestamp_ms();
        self.entries
            .iter()
            .filter(|(key, entry)| key.contains(&needle) && !entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Cleanup Expired ==
    /// Removes all expired entries and returns how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
