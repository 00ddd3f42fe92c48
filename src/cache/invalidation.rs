//! Cache Invalidation Module
//!
//! Named bulk deletes that mutation handlers call after writing to the database.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::CacheStore;

// == Key Prefixes ==
/// Domain prefixes under which cached values are stored.
pub struct CacheKeys;

impl CacheKeys {
    pub const PRODUCTS: &'static str = "products:";
    pub const DASHBOARD: &'static str = "dashboard:";
    pub const ORDERS: &'static str = "orders:";
    pub const INVENTORY: &'static str = "inventory:";
    pub const PRODUCTION_QUEUE: &'static str = "production_queue:";
    pub const USER_PROFILE: &'static str = "user_profile:";
    pub const SEARCH_RESULTS: &'static str = "search:";
    pub const API_RESPONSE: &'static str = "api_response:";
}

// == TTL Presets ==
/// Common cache lifetimes in seconds.
pub struct CacheTtl;

impl CacheTtl {
    pub const SHORT: u64 = 60;
    pub const MEDIUM: u64 = 300;
    pub const LONG: u64 = 1800;
    pub const VERY_LONG: u64 = 3600;
}

// == Cache Invalidator ==
/// Deletes every key under a domain prefix.
///
/// Deletion is best effort and not atomic as a set; anything missed still
/// expires with its TTL.
#[derive(Debug, Clone)]
pub struct CacheInvalidator {
    cache: Arc<CacheStore>,
}

impl CacheInvalidator {
    pub fn new(cache: Arc<CacheStore>) -> Self {
        Self { cache }
    }

    pub async fn invalidate_products(&self) -> usize {
        self.invalidate_prefix("Product", CacheKeys::PRODUCTS).await
    }

    pub async fn invalidate_dashboard(&self) -> usize {
        self.invalidate_prefix("Dashboard", CacheKeys::DASHBOARD).await
    }

    pub async fn invalidate_orders(&self) -> usize {
        self.invalidate_prefix("Orders", CacheKeys::ORDERS).await
    }

    pub async fn invalidate_inventory(&self) -> usize {
        self.invalidate_prefix("Inventory", CacheKeys::INVENTORY).await
    }

    pub async fn invalidate_production_queue(&self) -> usize {
        self.invalidate_prefix("Production queue", CacheKeys::PRODUCTION_QUEUE)
            .await
    }

    pub async fn invalidate_search(&self) -> usize {
        self.invalidate_prefix("Search", CacheKeys::SEARCH_RESULTS).await
    }

    /// Drops everything cached for one user.
    pub async fn invalidate_user(&self, user_id: &str) -> usize {
        let prefix = format!("{}{}", CacheKeys::USER_PROFILE, user_id);
        self.invalidate_prefix("User", &prefix).await
    }

    // == Invalidate Pattern ==
    /// Deletes every key matching an arbitrary trailing-wildcard pattern.
    ///
    /// Returns the number of keys deleted.
    pub async fn invalidate_pattern(&self, pattern: &str) -> usize {
        let keys = self.cache.keys(pattern).await;
        let count = keys.len();

        delete_all(&self.cache, keys).await;

        debug!(pattern = %pattern, deleted = count, "Cache pattern invalidated");
        count
    }

    async fn invalidate_prefix(&self, group: &str, prefix: &str) -> usize {
        let pattern = format!("{prefix}*");
        let count = self.invalidate_pattern(&pattern).await;
        debug!(group = %group, deleted = count, "Cache group invalidated");
        count
    }
}

/// Issues the deletes concurrently on the runtime.
async fn delete_all(cache: &Arc<CacheStore>, keys: Vec<String>) {
    let mut tasks = tokio::task::JoinSet::new();
    for key in keys {
        let cache = Arc::clone(cache);
        tasks.spawn(async move { cache.del(&key).await });
    }
    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            warn!(error = %e, "Cache delete task failed");
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;

    async fn populated() -> (Arc<CacheStore>, CacheInvalidator) {
        let cache = Arc::new(CacheStore::new(CacheConfig::disabled()));
        for key in [
            "products:{\"page\":1}",
            "products:{\"page\":2}",
            "dashboard:stats",
            "orders:recent",
            "inventory:levels",
            "production_queue:today",
            "user_profile:42",
            "user_profile:42:addresses",
            "user_profile:7",
            "search:tuna",
        ] {
            cache.set(key, b"1".to_vec(), CacheTtl::LONG).await;
        }
        let invalidator = CacheInvalidator::new(Arc::clone(&cache));
        (cache, invalidator)
    }

    #[tokio::test]
    async fn test_invalidate_products_only_touches_products() {
        let (cache, invalidator) = populated().await;

        assert_eq!(invalidator.invalidate_products().await, 2);

        assert!(cache.keys("products:*").await.is_empty());
        assert!(cache.get("products:{\"page\":1}").await.is_none());
        assert!(cache.get("dashboard:stats").await.is_some());
        assert!(cache.get("search:tuna").await.is_some());
    }

    #[tokio::test]
    async fn test_each_named_group() {
        let (cache, invalidator) = populated().await;

        assert_eq!(invalidator.invalidate_dashboard().await, 1);
        assert_eq!(invalidator.invalidate_orders().await, 1);
        assert_eq!(invalidator.invalidate_inventory().await, 1);
        assert_eq!(invalidator.invalidate_production_queue().await, 1);
        assert_eq!(invalidator.invalidate_search().await, 1);

        assert_eq!(cache.keys("*").await.len(), 5);
    }

    #[tokio::test]
    async fn test_invalidate_user_is_scoped() {
        let (cache, invalidator) = populated().await;

        assert_eq!(invalidator.invalidate_user("42").await, 2);

        assert!(cache.get("user_profile:42").await.is_none());
        assert!(cache.get("user_profile:7").await.is_some());
    }

    #[tokio::test]
    async fn test_invalidate_empty_group_is_noop() {
        let cache = Arc::new(CacheStore::new(CacheConfig::disabled()));
        let invalidator = CacheInvalidator::new(cache);

        assert_eq!(invalidator.invalidate_products().await, 0);
    }
}
