//! GetSubscriptionHandler - Cache-aside read of a single subscription.

use std::sync::Arc;

use crate::domain::foundation::SubscriptionId;
use crate::domain::subscription::{SubscriptionEntry, SubscriptionError};
use crate::ports::SubscriptionRepository;

use super::SubscriptionCachePolicy;

/// Query for one subscription by id.
#[derive(Debug, Clone, Copy)]
pub struct GetSubscriptionQuery {
    pub id: SubscriptionId,
}

/// Handler for reading subscriptions.
pub struct GetSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    cache: SubscriptionCachePolicy,
}

impl GetSubscriptionHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>, cache: SubscriptionCachePolicy) -> Self {
        Self { repository, cache }
    }

    /// Serves from cache when possible, otherwise reads the store and
    /// refills the cache.
    ///
    /// # Errors
    ///
    /// - `CacheUnavailable` if the cache backend fails (never treated as a miss)
    /// - `NotFound` / `StoreUnavailable` from the store on a miss
    pub async fn handle(
        &self,
        query: GetSubscriptionQuery,
    ) -> Result<SubscriptionEntry, SubscriptionError> {
        if let Some(entry) = self.cache.lookup(query.id).await? {
            tracing::debug!(subscription_id = %query.id, "Subscription served from cache");
            return Ok(entry);
        }

        let entry = self.repository.read(query.id).await?;
        self.cache.store(&entry).await;

        tracing::debug!(subscription_id = %query.id, "Subscription loaded from store");
        Ok(entry)
    }
}
