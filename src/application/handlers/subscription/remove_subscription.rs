//! RemoveSubscriptionHandler - Hard delete with cache invalidation.

use std::sync::Arc;

use crate::domain::foundation::SubscriptionId;
use crate::domain::subscription::SubscriptionError;
use crate::ports::SubscriptionRepository;

use super::SubscriptionCachePolicy;

/// Command to delete a subscription.
#[derive(Debug, Clone, Copy)]
pub struct RemoveSubscriptionCommand {
    pub id: SubscriptionId,
}

/// Handler for removing subscriptions.
pub struct RemoveSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    cache: SubscriptionCachePolicy,
}

impl RemoveSubscriptionHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>, cache: SubscriptionCachePolicy) -> Self {
        Self { repository, cache }
    }

    /// Invalidates the cache, deletes from the store, then invalidates again.
    ///
    /// The first invalidation makes concurrent readers fall through to the
    /// store; the second drops anything a reader refilled while the delete
    /// was in flight. A refill landing after the second invalidation is
    /// still possible and lives until the TTL expires.
    ///
    /// Returns the number of deleted rows.
    pub async fn handle(&self, cmd: RemoveSubscriptionCommand) -> Result<u64, SubscriptionError> {
        self.cache.evict(cmd.id).await;

        let rows = self.repository.remove(cmd.id).await?;

        self.cache.evict(cmd.id).await;

        if rows == 0 {
            return Err(SubscriptionError::not_found(cmd.id));
        }

        tracing::info!(subscription_id = %cmd.id, "Subscription removed");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::subscription::test_support::*;
    use crate::domain::foundation::{DomainError, Username};
    use crate::domain::subscription::{NewSubscription, SubscriptionEntry, SubscriptionTerms, SumQuery};
    use crate::ports::{CacheKey, SubscriptionCache};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use std::time::Duration;

    // ════════════════════════════════════════════════════════════════════════════
    // Call-order recording doubles
    // ════════════════════════════════════════════════════════════════════════════

    type CallLog = Arc<Mutex<Vec<&'static str>>>;

    struct RecordingCache {
        log: CallLog,
    }

    #[async_trait]
    impl SubscriptionCache for RecordingCache {
        async fn get(&self, _key: &CacheKey) -> Result<Option<SubscriptionEntry>, DomainError> {
            Ok(None)
        }

        async fn set(
            &self,
            _key: &CacheKey,
            _entry: &SubscriptionEntry,
            _ttl: Duration,
        ) -> Result<(), DomainError> {
            self.log.lock().unwrap().push("cache.set");
            Ok(())
        }

        async fn invalidate(&self, _key: &CacheKey) -> Result<(), DomainError> {
            self.log.lock().unwrap().push("cache.invalidate");
            Ok(())
        }
    }

    struct RecordingRepository {
        log: CallLog,
    }

    #[async_trait]
    impl SubscriptionRepository for RecordingRepository {
        async fn create(&self, _s: &NewSubscription) -> Result<SubscriptionId, DomainError> {
            unimplemented!()
        }

        async fn read(&self, _id: SubscriptionId) -> Result<SubscriptionEntry, DomainError> {
            unimplemented!()
        }

        async fn update(&self, _entry: &SubscriptionEntry) -> Result<u64, DomainError> {
            unimplemented!()
        }

        async fn remove(&self, _id: SubscriptionId) -> Result<u64, DomainError> {
            self.log.lock().unwrap().push("store.remove");
            Ok(1)
        }

        async fn list(
            &self,
            _username: &Username,
            _limit: u32,
            _offset: u32,
        ) -> Result<Vec<SubscriptionEntry>, DomainError> {
            unimplemented!()
        }

        async fn list_all(&self, _limit: u32, _offset: u32) -> Result<Vec<SubscriptionEntry>, DomainError> {
            unimplemented!()
        }

        async fn count_sum(&self, _query: &SumQuery) -> Result<i64, DomainError> {
            unimplemented!()
        }

        async fn find_due_on(&self, _date: NaiveDate) -> Result<Vec<SubscriptionEntry>, DomainError> {
            unimplemented!()
        }

        async fn ping(&self) -> Result<(), DomainError> {
            Ok(())
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn invalidates_before_and_after_store_delete() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let handler = RemoveSubscriptionHandler::new(
            Arc::new(RecordingRepository { log: log.clone() }),
            SubscriptionCachePolicy::with_default_ttl(Arc::new(RecordingCache { log: log.clone() })),
        );

        handler
            .handle(RemoveSubscriptionCommand { id: SubscriptionId::new(1) })
            .await
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["cache.invalidate", "store.remove", "cache.invalidate"]
        );
    }

    #[tokio::test]
    async fn removed_entry_is_gone_from_store_and_cache() {
        let fx = Fixture::new();
        let terms = SubscriptionTerms::from_request(&current_request(), today()).unwrap();
        let id = fx.repo.create(&terms.clone().into_new(user("alice"))).await.unwrap();
        fx.policy.store(&terms.into_entry(id, user("alice"))).await;

        let rows = RemoveSubscriptionHandler::new(fx.repo.clone(), fx.policy.clone())
            .handle(RemoveSubscriptionCommand { id })
            .await
            .unwrap();

        assert_eq!(rows, 1);
        assert!(fx.repo.is_empty().await);
        assert!(!fx.cache.contains(&CacheKey::subscription(id)).await);
    }

    #[tokio::test]
    async fn removing_unknown_id_is_not_found() {
        let fx = Fixture::new();
        let id = SubscriptionId::new(12);

        let err = RemoveSubscriptionHandler::new(fx.repo.clone(), fx.policy.clone())
            .handle(RemoveSubscriptionCommand { id })
            .await
            .unwrap_err();

        assert_eq!(err, SubscriptionError::NotFound(id));
    }

    #[tokio::test]
    async fn invalidation_failure_does_not_block_delete() {
        let fx = Fixture::new();
        let terms = SubscriptionTerms::from_request(&current_request(), today()).unwrap();
        let id = fx.repo.create(&terms.into_new(user("alice"))).await.unwrap();
        fx.cache.fail_writes(true);

        let rows = RemoveSubscriptionHandler::new(fx.repo.clone(), fx.policy.clone())
            .handle(RemoveSubscriptionCommand { id })
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn store_failure_is_propagated() {
        let fx = Fixture::new();
        fx.repo.set_unavailable(true);

        let err = RemoveSubscriptionHandler::new(fx.repo.clone(), fx.policy.clone())
            .handle(RemoveSubscriptionCommand { id: SubscriptionId::new(1) })
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::StoreUnavailable(_)));
    }
}
