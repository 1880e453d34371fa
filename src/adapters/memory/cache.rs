//! In-memory subscription cache with per-entry expiry.
//!
//! Values are stored as serialized JSON, the same way the Redis adapter
//! stores them, so a bad payload surfaces as a cache error here too.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::foundation::DomainError;
use crate::domain::subscription::SubscriptionEntry;
use crate::ports::{CacheKey, SubscriptionCache};

#[derive(Debug, Clone)]
struct CachedValue {
    payload: String,
    expires_at: Instant,
}

/// In-memory implementation of `SubscriptionCache`.
#[derive(Debug, Default)]
pub struct InMemorySubscriptionCache {
    values: RwLock<HashMap<String, CachedValue>>,
    read_failures: AtomicBool,
    write_failures: AtomicBool,
    hits: AtomicUsize,
    misses: AtomicUsize,
    invalidations: AtomicUsize,
}

impl InMemorySubscriptionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `get` fail with a backend error.
    pub fn fail_reads(&self, fail: bool) {
        self.read_failures.store(fail, Ordering::SeqCst);
    }

    /// Make `set` and `invalidate` fail with a backend error.
    pub fn fail_writes(&self, fail: bool) {
        self.write_failures.store(fail, Ordering::SeqCst);
    }

    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn miss_count(&self) -> usize {
        self.misses.load(Ordering::SeqCst)
    }

    pub fn invalidation_count(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }

    /// Whether an unexpired value exists under `key`.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.values
            .read()
            .await
            .get(key.as_str())
            .is_some_and(|v| v.expires_at > Instant::now())
    }

    /// Store a raw payload, bypassing serialization. For corrupt-value tests.
    pub async fn put_raw(&self, key: &CacheKey, payload: impl Into<String>, ttl: Duration) {
        self.values.write().await.insert(
            key.as_str().to_string(),
            CachedValue {
                payload: payload.into(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn check_writes(&self) -> Result<(), DomainError> {
        if self.write_failures.load(Ordering::SeqCst) {
            return Err(DomainError::cache("in-memory cache rejecting writes"));
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionCache for InMemorySubscriptionCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<SubscriptionEntry>, DomainError> {
        if self.read_failures.load(Ordering::SeqCst) {
            return Err(DomainError::cache("in-memory cache rejecting reads"));
        }

        let payload = {
            let values = self.values.read().await;
            values
                .get(key.as_str())
                .filter(|v| v.expires_at > Instant::now())
                .map(|v| v.payload.clone())
        };

        match payload {
            Some(payload) => {
                self.hits.fetch_add(1, Ordering::SeqCst);
                serde_json::from_str(&payload).map(Some).map_err(|e| {
                    DomainError::cache(format!("Corrupt cache value under {}: {}", key, e))
                })
            }
            None => {
                self.misses.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        }
    }

    async fn set(
        &self,
        key: &CacheKey,
        entry: &SubscriptionEntry,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        self.check_writes()?;
        let payload = serde_json::to_string(entry)
            .map_err(|e| DomainError::cache(format!("Failed to encode {}: {}", key, e)))?;
        self.put_raw(key, payload, ttl).await;
        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> Result<(), DomainError> {
        self.check_writes()?;
        self.values.write().await.remove(key.as_str());
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
