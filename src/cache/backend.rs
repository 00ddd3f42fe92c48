//! Cache Backend Module
//!
//! The shared, cross-process cache service the store prefers when connected.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, IntoConnectionInfo, RedisResult};
use tracing::debug;

/// Primary key/value service behind [`CacheStore`](super::CacheStore).
///
/// Every method may fail; the store catches each failure and serves the
/// request from its fallback map instead.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> RedisResult<Option<Vec<u8>>>;
    async fn set_ex(&self, key: &str, value: &[u8], ttl_seconds: u64) -> RedisResult<()>;
    async fn del(&self, key: &str) -> RedisResult<()>;
    async fn keys(&self, pattern: &str) -> RedisResult<Vec<String>>;
    async fn flush(&self) -> RedisResult<()>;
    async fn ping(&self) -> RedisResult<()>;
}

// == Redis Backend ==
/// Redis-backed implementation using a multiplexed connection manager.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    /// Opens a connection to `url`, bounded by `timeout`.
    ///
    /// `password` overrides any password embedded in the URL.
    pub async fn connect(
        url: &str,
        password: Option<&str>,
        timeout: Duration,
    ) -> RedisResult<Self> {
        let mut info = url.into_connection_info()?;
        if let Some(password) = password {
            info.redis.password = Some(password.to_string());
        }
        let client = redis::Client::open(info)?;

        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                redis::RedisError::from((
                    redis::ErrorKind::IoError,
                    "connection timed out",
                    format!("no connection within {}s", timeout.as_secs()),
                ))
            })??;

        debug!(url = %url, "Cache backend connection established");
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> RedisResult<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        conn.get(key).await
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl_seconds: u64) -> RedisResult<()> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry
        conn.set_ex(key, value, ttl_seconds.max(1)).await
    }

    async fn del(&self, key: &str) -> RedisResult<()> {
        let mut conn = self.conn.clone();
        conn.del(key).await
    }

    async fn keys(&self, pattern: &str) -> RedisResult<Vec<String>> {
        let mut conn = self.conn.clone();
        conn.keys(pattern).await
    }

    async fn flush(&self) -> RedisResult<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
        Ok(())
    }

    async fn ping(&self) -> RedisResult<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
