//! Cache Entry Module
//!
//! Defines the structure for fallback cache entries with TTL support.

use chrono::Utc;

// == Cache Entry ==
/// A single value held by the process-local fallback store.
///
/// Values are kept as serialized JSON bytes so the store stays generic;
/// typed access happens in [`CacheStore::get_json`](super::CacheStore::get_json).
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Serialized value
    pub value: Vec<u8>,
    /// Write timestamp (Unix milliseconds)
    pub stored_at_ms: i64,
    /// Time to live in seconds
    pub ttl_seconds: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(value: Vec<u8>, ttl_seconds: u64) -> Self {
        Self {
            value,
            stored_at_ms: current_timestamp_ms(),
            ttl_seconds,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived its TTL.
    ///
    /// An entry is expired once strictly more than `ttl_seconds` have elapsed
    /// since it was stored; at exactly the TTL boundary it is still served.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Expiry check against an explicit clock reading.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms - self.stored_at_ms > self.ttl_ms()
    }

    // == Time To Live ==
    /// Returns the remaining lifetime in seconds, rounded up, or 0 if expired.
    pub fn ttl_remaining(&self) -> u64 {
        let remaining = self.stored_at_ms + self.ttl_ms() - current_timestamp_ms();
        if remaining <= 0 {
            0
        } else {
            (remaining as u64).div_ceil(1000)
        }
    }

    fn ttl_ms(&self) -> i64 {
        i64::try_from(self.ttl_seconds.saturating_mul(1000)).unwrap_or(i64::MAX)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(b"\"cat food\"".to_vec(), 60);

        assert_eq!(entry.value, b"\"cat food\"".to_vec());
        assert_eq!(entry.ttl_seconds, 60);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(b"1".to_vec(), 1);

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry {
            value: b"1".to_vec(),
            stored_at_ms: 10_000,
            ttl_seconds: 5,
        };

        assert!(!entry.is_expired_at(15_000), "exactly at TTL is still live");
        assert!(entry.is_expired_at(15_001));
    }

    #[test]
    fn test_zero_ttl_expires_after_first_millisecond() {
        let entry = CacheEntry {
            value: b"1".to_vec(),
            stored_at_ms: 500,
            ttl_seconds: 0,
        };

        assert!(!entry.is_expired_at(500));
        assert!(entry.is_expired_at(501));
    }

    #[test]
    fn test_ttl_remaining_seconds() {
        let entry = CacheEntry::new(b"1".to_vec(), 10);

        let remaining = entry.ttl_remaining();
        assert!(remaining <= 10);
        assert!(remaining >= 9);
    }

    #[test]
    fn test_ttl_remaining_expired() {
        let entry = CacheEntry {
            value: b"1".to_vec(),
            stored_at_ms: current_timestamp_ms() - 5_000,
            ttl_seconds: 1,
        };

        assert_eq!(entry.ttl_remaining(), 0);
    }
}
