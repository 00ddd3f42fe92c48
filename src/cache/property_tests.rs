//! Property-Based Tests for Cache Module
//!
//! Uses proptest to verify the store and invalidation contracts over arbitrary
//! keys and values.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use crate::cache::{CacheInvalidator, CacheStore, FallbackStore};
use crate::config::CacheConfig;

// == Strategies ==
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-z_]{1,12}:[a-zA-Z0-9_]{1,32}".prop_map(|s| s)
}

fn valid_value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Vec<u8> },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), valid_value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn fallback_only() -> CacheStore {
    CacheStore::new(CacheConfig::disabled())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // set(k, v, ttl) followed immediately by get(k) returns v.
    #[test]
    fn prop_roundtrip_storage(
        key in valid_key_strategy(),
        value in valid_value_strategy(),
        ttl in 1u64..86_400,
    ) {
        let store = fallback_only();
        let retrieved = tokio_test::block_on(async {
            store.set(&key, value.clone(), ttl).await;
            store.get(&key).await
        });
        prop_assert_eq!(retrieved, Some(value));
    }

    // The store behaves like a plain map for any op sequence inside the TTL.
    #[test]
    fn prop_store_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let store = fallback_only();
        let mut model: HashMap<String, Vec<u8>> = HashMap::new();

        tokio_test::block_on(async {
            for op in ops {
                match op {
                    CacheOp::Set { key, value } => {
                        store.set(&key, value.clone(), 600).await;
                        model.insert(key, value);
                    }
                    CacheOp::Get { key } => {
                        prop_assert_eq!(store.get(&key).await, model.get(&key).cloned());
                    }
                    CacheOp::Delete { key } => {
                        store.del(&key).await;
                        model.remove(&key);
                    }
                }
            }
            prop_assert_eq!(store.stats().await.fallback_entries, model.len());
            Ok(())
        })?;
    }

    // Invalidating a prefix removes exactly the keys under it.
    #[test]
    fn prop_invalidation_is_scoped(
        keys in prop::collection::hash_set("[a-z]{1,8}", 1..20),
        others in prop::collection::hash_set("[a-z]{1,8}", 0..20),
    ) {
        let cache = Arc::new(fallback_only());
        let invalidator = CacheInvalidator::new(Arc::clone(&cache));

        tokio_test::block_on(async {
            for k in &keys {
                cache.set(&format!("products:{k}"), b"1".to_vec(), 600).await;
            }
            for k in &others {
                cache.set(&format!("orders:{k}"), b"1".to_vec(), 600).await;
            }

            let deleted = invalidator.invalidate_products().await;
            prop_assert_eq!(deleted, keys.len());
            prop_assert!(cache.keys("products:*").await.is_empty());
            prop_assert_eq!(cache.keys("orders:*").await.len(), others.len());
            Ok(())
        })?;
    }

    // The synchronous fallback map never returns a deleted key.
    #[test]
    fn prop_fallback_delete_removes_entry(key in valid_key_strategy(), value in valid_value_strategy()) {
        let mut store = FallbackStore::new();
        store.set(&key, value, 600);
        prop_assert!(store.get(&key).is_some());
        prop_assert!(store.delete(&key));
        prop_assert!(store.get(&key).is_none());
    }
}

// Fewer cases for the sleeping TTL property
proptest! {
    #![proptest_config(ProptestConfig::with_cases(3))]

    // get(k) after the TTL has elapsed returns nothing.
    #[test]
    fn prop_ttl_expiration_behavior(key in valid_key_strategy(), value in valid_value_strategy()) {
        let store = fallback_only();

        let (before, after) = tokio_test::block_on(async {
            store.set(&key, value.clone(), 1).await;
            let before = store.get(&key).await;
            tokio::time::sleep(Duration::from_millis(1100)).await;
            (before, store.get(&key).await)
        });

        prop_assert_eq!(before, Some(value));
        prop_assert!(after.is_none(), "Entry should not be found after TTL expires");
    }
}
