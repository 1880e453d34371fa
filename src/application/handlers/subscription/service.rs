//! SubscriptionService - Single entry point over the subscription handlers.
//!
//! Callers that need the whole lifecycle hold one of these instead of six
//! handlers. Each method builds the matching command or query and
//! delegates.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{Role, SubscriptionId, Username};
use crate::domain::subscription::{
    FilterSum, SubscriptionEntry, SubscriptionError, SubscriptionRequest,
};
use crate::ports::{Clock, SubscriptionCache, SubscriptionRepository};

use super::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, GetSubscriptionHandler,
    GetSubscriptionQuery, ListSubscriptionsHandler, ListSubscriptionsQuery,
    RemoveSubscriptionCommand, RemoveSubscriptionHandler, SubscriptionCachePolicy,
    SumSubscriptionsHandler, SumSubscriptionsQuery, UpdateSubscriptionCommand,
    UpdateSubscriptionHandler,
};

/// Subscription lifecycle operations over one store, cache and clock.
pub struct SubscriptionService {
    create: CreateSubscriptionHandler,
    get: GetSubscriptionHandler,
    update: UpdateSubscriptionHandler,
    remove: RemoveSubscriptionHandler,
    list: ListSubscriptionsHandler,
    sum: SumSubscriptionsHandler,
}

impl SubscriptionService {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        cache: Arc<dyn SubscriptionCache>,
        clock: Arc<dyn Clock>,
        cache_ttl: Duration,
    ) -> Self {
        let policy = SubscriptionCachePolicy::new(cache, cache_ttl);
        Self {
            create: CreateSubscriptionHandler::new(repository.clone(), policy.clone(), clock.clone()),
            get: GetSubscriptionHandler::new(repository.clone(), policy.clone()),
            update: UpdateSubscriptionHandler::new(repository.clone(), policy.clone(), clock),
            remove: RemoveSubscriptionHandler::new(repository.clone(), policy),
            list: ListSubscriptionsHandler::new(repository.clone()),
            sum: SumSubscriptionsHandler::new(repository),
        }
    }

    pub async fn create(
        &self,
        username: Username,
        request: SubscriptionRequest,
    ) -> Result<SubscriptionId, SubscriptionError> {
        self.create
            .handle(CreateSubscriptionCommand { username, request })
            .await
    }

    pub async fn read(&self, id: SubscriptionId) -> Result<SubscriptionEntry, SubscriptionError> {
        self.get.handle(GetSubscriptionQuery { id }).await
    }

    pub async fn update(
        &self,
        id: SubscriptionId,
        username: Username,
        request: SubscriptionRequest,
    ) -> Result<u64, SubscriptionError> {
        self.update
            .handle(UpdateSubscriptionCommand {
                id,
                username,
                request,
            })
            .await
    }

    pub async fn remove(&self, id: SubscriptionId) -> Result<u64, SubscriptionError> {
        self.remove.handle(RemoveSubscriptionCommand { id }).await
    }

    pub async fn list(
        &self,
        username: Username,
        role: Role,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<SubscriptionEntry>, SubscriptionError> {
        self.list
            .handle(ListSubscriptionsQuery {
                username,
                role,
                limit,
                offset,
            })
            .await
    }

    pub async fn count_sum_with_filter(&self, filter: FilterSum) -> Result<i64, SubscriptionError> {
        self.sum.handle(SumSubscriptionsQuery { filter }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::subscription::test_support::*;

    fn service(fx: &Fixture) -> SubscriptionService {
        SubscriptionService::new(
            fx.repo.clone(),
            fx.cache.clone(),
            fx.clock.clone(),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn full_lifecycle_through_service() {
        let fx = Fixture::new();
        let svc = service(&fx);

        let id = svc.create(user("alice"), current_request()).await.unwrap();
        assert_eq!(svc.read(id).await.unwrap().price, 799);

        let bumped = SubscriptionRequest::new("Netflix", 999, 6, "07-2025");
        assert_eq!(svc.update(id, user("alice"), bumped).await.unwrap(), 1);
        assert_eq!(svc.read(id).await.unwrap().price, 999);

        let page = svc.list(user("alice"), Role::User, 0, 0).await.unwrap();
        assert_eq!(page.len(), 1);

        let filter = FilterSum::parse(user("alice"), None, "07-2025", 1).unwrap();
        assert_eq!(svc.count_sum_with_filter(filter).await.unwrap(), 999);

        assert_eq!(svc.remove(id).await.unwrap(), 1);
        assert_eq!(svc.read(id).await.unwrap_err(), SubscriptionError::NotFound(id));
    }
}
