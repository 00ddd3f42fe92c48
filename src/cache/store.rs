//! Cache Store Module
//!
//! Availability-first cache facade: prefers the shared backend, and degrades
//! to the process-local fallback map whenever the backend is absent or failing.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{CacheBackend, CacheStats, CacheStatsSnapshot, FallbackStore, RedisBackend};
use crate::config::CacheConfig;

// == Connection State ==
/// Whether the store is talking to its backend.
///
/// Decided once by [`CacheStore::initialize`]; there is no reconnection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Backend turned off by configuration; fallback only
    Disabled,
    /// Backend not configured, unreachable, or shut down; fallback only
    Disconnected,
    /// Backend reachable at startup; preferred for every operation
    Connected,
}

struct Primary {
    state: ConnectionState,
    backend: Option<Arc<dyn CacheBackend>>,
}

// == Cache Store ==
/// Key/value cache with TTLs and transparent fallback.
///
/// No method returns a backend error: failures are logged, counted, and the
/// operation is carried out against the fallback map instead.
pub struct CacheStore {
    config: CacheConfig,
    primary: RwLock<Primary>,
    fallback: RwLock<FallbackStore>,
    stats: Mutex<CacheStats>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store that serves from the fallback map until
    /// [`initialize`](Self::initialize) connects the backend.
    pub fn new(config: CacheConfig) -> Self {
        let state = if config.enabled {
            ConnectionState::Disconnected
        } else {
            ConnectionState::Disabled
        };
        Self {
            config,
            primary: RwLock::new(Primary {
                state,
                backend: None,
            }),
            fallback: RwLock::new(FallbackStore::new()),
            stats: Mutex::new(CacheStats::new()),
        }
    }

    /// Creates a store around an already-constructed backend.
    ///
    /// The backend is only used after `initialize` has pinged it successfully.
    pub fn with_backend(config: CacheConfig, backend: Arc<dyn CacheBackend>) -> Self {
        let mut store = Self::new(config);
        store.primary.get_mut().backend = Some(backend);
        store
    }

    // == Lifecycle ==
    /// Performs the one-time startup connection attempt.
    ///
    /// Never fails: an unreachable backend leaves the store in
    /// [`ConnectionState::Disconnected`].
    pub async fn initialize(&self) -> ConnectionState {
        let mut primary = self.primary.write().await;

        if !self.config.enabled {
            info!("Cache backend disabled, serving from fallback store");
            primary.state = ConnectionState::Disabled;
            primary.backend = None;
            return primary.state;
        }

        if primary.backend.is_none() {
            let Some(url) = self.config.backend_url.as_deref() else {
                info!("No cache backend configured, serving from fallback store");
                primary.state = ConnectionState::Disconnected;
                return primary.state;
            };

            match RedisBackend::connect(
                url,
                self.config.password.as_deref(),
                self.config.connect_timeout,
            )
            .await
            {
                Ok(backend) => primary.backend = Some(Arc::new(backend)),
                Err(e) => {
                    warn!(error = %e, "Cache backend connection failed, serving from fallback store");
                    primary.state = ConnectionState::Disconnected;
                    return primary.state;
                }
            }
        }

        let Some(backend) = primary.backend.clone() else {
            primary.state = ConnectionState::Disconnected;
            return primary.state;
        };

        match tokio::time::timeout(self.config.connect_timeout, backend.ping()).await {
            Ok(Ok(())) => {
                info!("Cache backend connected");
                primary.state = ConnectionState::Connected;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Cache backend ping failed, serving from fallback store");
                primary.state = ConnectionState::Disconnected;
                primary.backend = None;
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.config.connect_timeout.as_secs(),
                    "Cache backend ping timed out, serving from fallback store"
                );
                primary.state = ConnectionState::Disconnected;
                primary.backend = None;
            }
        }

        primary.state
    }

    /// Drops the backend handle. Subsequent calls use the fallback map.
    pub async fn shutdown(&self) {
        let mut primary = self.primary.write().await;
        if primary.backend.take().is_some() {
            info!("Cache backend connection closed");
        }
        if primary.state == ConnectionState::Connected {
            primary.state = ConnectionState::Disconnected;
        }
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.primary.read().await.state
    }

    async fn connected_backend(&self) -> Option<Arc<dyn CacheBackend>> {
        let primary = self.primary.read().await;
        match primary.state {
            ConnectionState::Connected => primary.backend.clone(),
            _ => None,
        }
    }

    // == Get ==
    /// Returns the live value for `key`, or `None`.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let value = match self.connected_backend().await {
            Some(backend) => match backend.get(key).await {
                Ok(value) => value,
                Err(e) => {
                    warn!(key = %key, error = %e, "Cache backend GET failed, using fallback");
                    self.stats.lock().await.record_backend_error();
                    self.fallback.write().await.get(key)
                }
            },
            None => self.fallback.write().await.get(key),
        };

        let mut stats = self.stats.lock().await;
        if value.is_some() {
            debug!(key = %key, "Cache hit");
            stats.record_hit();
        } else {
            debug!(key = %key, "Cache miss");
            stats.record_miss();
        }

        value
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl_seconds`.
    ///
    /// If the backend write fails the value lands in the fallback map.
    pub async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) {
        if let Some(backend) = self.connected_backend().await {
            match backend.set_ex(key, &value, ttl_seconds).await {
                Ok(()) => {
                    debug!(key = %key, ttl_secs = ttl_seconds, "Cache set");
                    return;
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Cache backend SET failed, using fallback");
                    self.stats.lock().await.record_backend_error();
                }
            }
        }

        self.fallback.write().await.set(key, value, ttl_seconds);
        debug!(key = %key, ttl_secs = ttl_seconds, "Cache set (fallback)");
    }

    // == Delete ==
    /// Removes `key` from the backend and the fallback map. Idempotent.
    pub async fn del(&self, key: &str) {
        if let Some(backend) = self.connected_backend().await {
            if let Err(e) = backend.del(key).await {
                warn!(key = %key, error = %e, "Cache backend DEL failed");
                self.stats.lock().await.record_backend_error();
            }
        }

        self.fallback.write().await.delete(key);
        debug!(key = %key, "Cache deleted");
    }

    // == Keys ==
    /// Lists keys matching a trailing-wildcard `pattern` such as `products:*`.
    pub async fn keys(&self, pattern: &str) -> Vec<String> {
        let mut keys = match self.connected_backend().await {
            Some(backend) => match backend.keys(pattern).await {
                Ok(keys) => keys,
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "Cache backend KEYS failed");
                    self.stats.lock().await.record_backend_error();
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        // Values written while the backend was failing live only in the fallback map
        for key in self.fallback.read().await.keys(pattern) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        keys
    }

    // == Clear ==
    /// Empties the backend database and the fallback map.
    pub async fn clear(&self) {
        if let Some(backend) = self.connected_backend().await {
            if let Err(e) = backend.flush().await {
                warn!(error = %e, "Cache backend FLUSHDB failed");
                self.stats.lock().await.record_backend_error();
            }
        }

        self.fallback.write().await.clear();
        debug!("Cache cleared");
    }

    // == Typed Access ==
    /// Fetches and decodes a JSON value. Undecodable values are treated as absent.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.get(key).await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding undecodable cache value");
                None
            }
        }
    }

    /// Encodes `value` as JSON and stores it.
    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> serde_json::Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.set(key, bytes, ttl_seconds).await;
        Ok(())
    }

    // == Health ==
    /// Pings the backend. `None` when the store is not connected.
    pub async fn ping_backend(&self) -> Option<redis::RedisResult<()>> {
        let backend = self.connected_backend().await?;
        Some(backend.ping().await)
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStatsSnapshot {
        let state = self.connection_state().await;
        let fallback_entries = self.fallback.read().await.len();
        let stats = self.stats.lock().await;
        CacheStatsSnapshot::new(state, &stats, fallback_entries)
    }

    // == Cleanup Expired ==
    /// Sweeps expired entries out of the fallback map.
    pub async fn cleanup_expired(&self) -> usize {
        self.fallback.write().await.cleanup_expired()
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
