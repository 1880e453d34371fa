//! Cache policy shared by the subscription handlers.
//!
//! Reads go through `lookup`, which surfaces backend failures. Writes go
//! through `store` and `evict`, which only log: the store is the source of
//! truth and a cache outage must not fail an operation that already
//! committed there.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::SubscriptionId;
use crate::domain::subscription::{SubscriptionEntry, SubscriptionError};
use crate::ports::{CacheKey, SubscriptionCache};

/// Default lifetime of a cached entry.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Cache handle plus the TTL applied to every write.
#[derive(Clone)]
pub struct SubscriptionCachePolicy {
    cache: Arc<dyn SubscriptionCache>,
    ttl: Duration,
}

impl SubscriptionCachePolicy {
    pub fn new(cache: Arc<dyn SubscriptionCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub fn with_default_ttl(cache: Arc<dyn SubscriptionCache>) -> Self {
        Self::new(cache, DEFAULT_CACHE_TTL)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached copy of an entry, `None` on a clean miss.
    ///
    /// # Errors
    ///
    /// `CacheUnavailable` when the backend fails. A failing backend is not
    /// treated as a miss.
    pub async fn lookup(
        &self,
        id: SubscriptionId,
    ) -> Result<Option<SubscriptionEntry>, SubscriptionError> {
        self.cache
            .get(&CacheKey::subscription(id))
            .await
            .map_err(|e| SubscriptionError::cache_unavailable(e.to_string()))
    }

    /// Best-effort write of an entry.
    pub async fn store(&self, entry: &SubscriptionEntry) {
        let key = CacheKey::subscription(entry.id);
        if let Err(e) = self.cache.set(&key, entry, self.ttl).await {
            tracing::warn!(cache_key = %key, error = %e, "Cache write failed, continuing without cache");
        }
    }

    /// Best-effort invalidation of an entry.
    pub async fn evict(&self, id: SubscriptionId) {
        let key = CacheKey::subscription(id);
        if let Err(e) = self.cache.invalidate(&key).await {
            tracing::warn!(cache_key = %key, error = %e, "Cache invalidation failed");
        }
    }
}

impl std::fmt::Debug for SubscriptionCachePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionCachePolicy")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
