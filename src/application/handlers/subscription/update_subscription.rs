//! UpdateSubscriptionHandler - Full replacement of a subscription.

use std::sync::Arc;

use crate::domain::foundation::{SubscriptionId, Username};
use crate::domain::subscription::{SubscriptionError, SubscriptionRequest, SubscriptionTerms};
use crate::ports::{Clock, SubscriptionRepository};

use super::SubscriptionCachePolicy;

/// Command to replace a subscription's terms.
///
/// The request must carry the complete entry. Nothing is merged with the
/// stored row: an omitted `is_active` becomes `true`, and every date is
/// recomputed from `start_date` and `counter_months`.
#[derive(Debug, Clone)]
pub struct UpdateSubscriptionCommand {
    pub id: SubscriptionId,
    pub username: Username,
    pub request: SubscriptionRequest,
}

/// Handler for updating subscriptions.
pub struct UpdateSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    cache: SubscriptionCachePolicy,
    clock: Arc<dyn Clock>,
}

impl UpdateSubscriptionHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        cache: SubscriptionCachePolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            cache,
            clock,
        }
    }

    /// Re-validates the term, writes the store, then overwrites the cache
    /// with the value just written.
    ///
    /// Returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// - `InvalidTerm` if the new term already ended (store untouched)
    /// - `NotFound` if no row with this id belongs to the command's owner
    ///   (cache untouched)
    /// - `StoreUnavailable` if the store fails
    pub async fn handle(&self, cmd: UpdateSubscriptionCommand) -> Result<u64, SubscriptionError> {
        let terms = SubscriptionTerms::from_request(&cmd.request, self.clock.today())?;
        let entry = terms.into_entry(cmd.id, cmd.username);

        let rows = self.repository.update(&entry).await?;
        if rows == 0 {
            return Err(SubscriptionError::not_found(cmd.id));
        }

        self.cache.store(&entry).await;

        tracing::info!(
            subscription_id = %cmd.id,
            next_payment_date = %entry.next_payment_date,
            "Subscription updated"
        );

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::subscription::test_support::*;
    use crate::ports::{CacheKey, SubscriptionCache};
    use chrono::NaiveDate;

    fn handler(fx: &Fixture) -> UpdateSubscriptionHandler {
        UpdateSubscriptionHandler::new(fx.repo.clone(), fx.policy.clone(), fx.clock.clone())
    }

    async fn seed(fx: &Fixture) -> SubscriptionId {
        let terms = SubscriptionTerms::from_request(&current_request(), today()).unwrap();
        let id = fx.repo.create(&terms.clone().into_new(user("alice"))).await.unwrap();
        fx.policy.store(&terms.into_entry(id, user("alice"))).await;
        id
    }

    fn command(id: SubscriptionId, request: SubscriptionRequest) -> UpdateSubscriptionCommand {
        UpdateSubscriptionCommand {
            id,
            username: user("alice"),
            request,
        }
    }

    #[tokio::test]
    async fn recomputes_next_payment_and_overwrites_cache() {
        let fx = Fixture::new();
        let id = seed(&fx).await;
        let request = SubscriptionRequest::new("Netflix Premium", 1299, 12, "2025-06-20");

        let rows = handler(&fx).handle(command(id, request)).await.unwrap();
        assert_eq!(rows, 1);

        let stored = fx.repo.read(id).await.unwrap();
        assert_eq!(stored.service_name, "Netflix Premium");
        assert_eq!(stored.next_payment_date, NaiveDate::from_ymd_opt(2025, 7, 20).unwrap());

        let cached = fx.cache.get(&CacheKey::subscription(id)).await.unwrap();
        assert_eq!(cached, Some(stored));
    }

    #[tokio::test]
    async fn omitted_fields_are_not_merged_from_previous_value() {
        let fx = Fixture::new();
        let id = seed(&fx).await;
        handler(&fx)
            .handle(command(id, current_request().with_active(false)))
            .await
            .unwrap();

        handler(&fx).handle(command(id, current_request())).await.unwrap();
        assert!(fx.repo.read(id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn lapsed_term_is_rejected_and_nothing_changes() {
        let fx = Fixture::new();
        let id = seed(&fx).await;
        let before = fx.repo.read(id).await.unwrap();
        let writes = fx.repo.write_count();

        let err = handler(&fx).handle(command(id, lapsed_request())).await.unwrap_err();

        assert!(matches!(err, SubscriptionError::InvalidTerm { .. }));
        assert_eq!(fx.repo.write_count(), writes);
        assert_eq!(fx.repo.read(id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found_and_not_cached() {
        let fx = Fixture::new();
        let id = SubscriptionId::new(77);

        let err = handler(&fx).handle(command(id, current_request())).await.unwrap_err();

        assert_eq!(err, SubscriptionError::NotFound(id));
        assert!(!fx.cache.contains(&CacheKey::subscription(id)).await);
    }

    #[tokio::test]
    async fn foreign_owner_is_not_found_and_row_is_kept() {
        let fx = Fixture::new();
        let id = seed(&fx).await;
        let before = fx.repo.read(id).await.unwrap();
        let cmd = UpdateSubscriptionCommand {
            id,
            username: user("mallory"),
            request: SubscriptionRequest::new("Hijacked", 1, 12, "2025-06-20"),
        };

        let err = handler(&fx).handle(cmd).await.unwrap_err();

        assert_eq!(err, SubscriptionError::NotFound(id));
        assert_eq!(fx.repo.read(id).await.unwrap(), before);
        let cached = fx.cache.get(&CacheKey::subscription(id)).await.unwrap();
        assert_eq!(cached.map(|e| e.username), Some(user("alice")));
    }

    #[tokio::test]
    async fn cache_failure_does_not_fail_update() {
        let fx = Fixture::new();
        let id = seed(&fx).await;
        fx.cache.fail_writes(true);

        assert_eq!(handler(&fx).handle(command(id, current_request())).await.unwrap(), 1);
    }
}
