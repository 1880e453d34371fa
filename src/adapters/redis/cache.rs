//! Redis-backed subscription cache.
//!
//! Entries are stored as JSON strings with `SET key value EX ttl`, read with
//! `GET`, and removed with `DEL`. Keys are the bare `subscription:<id>`
//! strings so an existing cache population stays readable.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::domain::foundation::DomainError;
use crate::domain::subscription::SubscriptionEntry;
use crate::ports::{CacheKey, SubscriptionCache};

/// Redis implementation of the `SubscriptionCache` port.
#[derive(Clone)]
pub struct RedisSubscriptionCache {
    conn: MultiplexedConnection,
}

impl RedisSubscriptionCache {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Open a multiplexed connection to `url` and wrap it.
    ///
    /// Gives up once `timeout` elapses without a connection.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, DomainError> {
        let client = redis::Client::open(url)
            .map_err(|e| DomainError::cache(format!("Invalid Redis URL: {}", e)))?;
        let conn = tokio::time::timeout(timeout, client.get_multiplexed_tokio_connection())
            .await
            .map_err(|_| {
                DomainError::cache(format!("Timed out connecting to Redis after {:?}", timeout))
            })?
            .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;
        Ok(Self::new(conn))
    }
}

/// Redis rejects `EX 0`, so sub-second TTLs round up to one second.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl SubscriptionCache for RedisSubscriptionCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<SubscriptionEntry>, DomainError> {
        let mut conn = self.conn.clone();

        let payload: Option<String> = conn
            .get(key.as_str())
            .await
            .map_err(|e: redis::RedisError| DomainError::cache(e.to_string()))?;

        payload
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|e| {
                    DomainError::cache(format!("Corrupt cache value under {}: {}", key, e))
                })
            })
            .transpose()
    }

    async fn set(
        &self,
        key: &CacheKey,
        entry: &SubscriptionEntry,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let payload = serde_json::to_string(entry)
            .map_err(|e| DomainError::cache(format!("Failed to encode {}: {}", key, e)))?;
        let mut conn = self.conn.clone();

        redis::cmd("SET")
            .arg(key.as_str())
            .arg(payload)
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| DomainError::cache(e.to_string()))?;

        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(key.as_str())
            .await
            .map_err(|e: redis::RedisError| DomainError::cache(e.to_string()))?;

        Ok(())
    }
}

impl std::fmt::Debug for RedisSubscriptionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSubscriptionCache").finish_non_exhaustive()
    }
}
