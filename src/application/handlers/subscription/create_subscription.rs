//! CreateSubscriptionHandler - Command handler for registering a subscription.

use std::sync::Arc;

use crate::domain::foundation::{SubscriptionId, Username};
use crate::domain::subscription::{SubscriptionError, SubscriptionRequest, SubscriptionTerms};
use crate::ports::{Clock, SubscriptionRepository};

use super::SubscriptionCachePolicy;

/// Command to create a subscription for its owner.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    pub username: Username,
    pub request: SubscriptionRequest,
}

/// Handler for creating subscriptions.
pub struct CreateSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    cache: SubscriptionCachePolicy,
    clock: Arc<dyn Clock>,
}

impl CreateSubscriptionHandler {
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

    /// Validates the term, persists the entry and warms the cache.
    ///
    /// The store is only touched once the term is known to be current. A
    /// cache write failure does not fail the creation.
    pub async fn handle(
        &self,
        cmd: CreateSubscriptionCommand,
    ) -> Result<SubscriptionId, SubscriptionError> {
        let terms = SubscriptionTerms::from_request(&cmd.request, self.clock.today())?;
        let new_subscription = terms.into_new(cmd.username);

        let id = self.repository.create(&new_subscription).await?;

        let entry = new_subscription.with_id(id);
        self.cache.store(&entry).await;

        tracing::info!(
            subscription_id = %id,
            username = %entry.username,
            service = %entry.service_name,
            next_payment_date = %entry.next_payment_date,
            "Subscription created"
        );

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::subscription::test_support::*;
    use crate::ports::{CacheKey, SubscriptionCache};
    use chrono::NaiveDate;

    fn handler(fx: &Fixture) -> CreateSubscriptionHandler {
        CreateSubscriptionHandler::new(fx.repo.clone(), fx.policy.clone(), fx.clock.clone())
    }

    fn command(request: SubscriptionRequest) -> CreateSubscriptionCommand {
        CreateSubscriptionCommand {
            username: user("alice"),
            request,
        }
    }

    #[tokio::test]
    async fn creates_entry_with_next_payment_one_month_after_start() {
        let fx = Fixture::new();
        let id = handler(&fx).handle(command(current_request())).await.unwrap();

        let stored = fx.repo.read(id).await.unwrap();
        assert_eq!(stored.username, user("alice"));
        assert_eq!(stored.start_date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        assert_eq!(stored.next_payment_date, NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
        assert!(stored.is_active);
    }

    #[tokio::test]
    async fn warms_cache_with_created_entry() {
        let fx = Fixture::new();
        let id = handler(&fx).handle(command(current_request())).await.unwrap();

        let cached = fx.cache.get(&CacheKey::subscription(id)).await.unwrap();
        assert_eq!(cached, Some(fx.repo.read(id).await.unwrap()));
    }

    #[tokio::test]
    async fn lapsed_term_is_rejected_without_touching_store() {
        let fx = Fixture::new();
        let err = handler(&fx).handle(command(lapsed_request())).await.unwrap_err();

        assert!(matches!(err, SubscriptionError::InvalidTerm { .. }));
        assert!(fx.repo.is_empty().await);
        assert_eq!(fx.repo.write_count(), 0);
    }

    #[tokio::test]
    async fn cache_failure_does_not_fail_creation() {
        let fx = Fixture::new();
        fx.cache.fail_writes(true);

        let id = handler(&fx).handle(command(current_request())).await.unwrap();
        assert!(fx.repo.read(id).await.is_ok());
    }

    #[tokio::test]
    async fn store_failure_is_propagated() {
        let fx = Fixture::new();
        fx.repo.set_unavailable(true);

        let err = handler(&fx).handle(command(current_request())).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn invalid_request_is_rejected() {
        let fx = Fixture::new();
        let request = SubscriptionRequest::new("", 100, 1, "07-2025");

        let err = handler(&fx).handle(command(request)).await.unwrap_err();
        assert!(err.is_client_error());
        assert!(fx.repo.is_empty().await);
    }
}
