//! SumSubscriptionsHandler - Price total over a window of months.

use std::sync::Arc;

use crate::domain::subscription::{FilterSum, SubscriptionError};
use crate::ports::SubscriptionRepository;

/// Query for the total price matching a filter. The filter's username is
/// the owner whose entries are summed.
#[derive(Debug, Clone)]
pub struct SumSubscriptionsQuery {
    pub filter: FilterSum,
}

/// Handler for price aggregation. Aggregates are cheap and rarely repeated,
/// so they bypass the cache.
pub struct SumSubscriptionsHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl SumSubscriptionsHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: SumSubscriptionsQuery) -> Result<i64, SubscriptionError> {
        let sum_query = query.filter.to_query()?;
        let total = self.repository.count_sum(&sum_query).await?;

        tracing::debug!(
            username = %sum_query.username,
            service = ?sum_query.service_name,
            from = %sum_query.window.from,
            to = %sum_query.window.to,
            total,
            "Summed subscription prices"
        );

        Ok(total)
    }
}
