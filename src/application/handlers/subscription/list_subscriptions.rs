//! ListSubscriptionsHandler - Paginated listing scoped by role.

use std::sync::Arc;

use crate::domain::foundation::{Role, Username};
use crate::domain::subscription::{SubscriptionEntry, SubscriptionError};
use crate::ports::SubscriptionRepository;

/// Page size used when the caller asks for zero entries.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query for one page of subscriptions.
///
/// `role` comes from the caller's authenticated context and is trusted as-is.
#[derive(Debug, Clone)]
pub struct ListSubscriptionsQuery {
    pub username: Username,
    pub role: Role,
    pub limit: u32,
    pub offset: u32,
}

impl ListSubscriptionsQuery {
    /// Limit after applying the default and the upper bound.
    pub fn effective_limit(&self) -> u32 {
        match self.limit {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        }
    }
}

/// Handler for listing subscriptions. Results are never cached.
pub struct ListSubscriptionsHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl ListSubscriptionsHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    /// Admins page through every owner's entries; everyone else through
    /// their own.
    pub async fn handle(
        &self,
        query: ListSubscriptionsQuery,
    ) -> Result<Vec<SubscriptionEntry>, SubscriptionError> {
        let limit = query.effective_limit();

        let page = if query.role.is_admin() {
            self.repository.list_all(limit, query.offset).await?
        } else {
            self.repository
                .list(&query.username, limit, query.offset)
                .await?
        };

        tracing::debug!(
            username = %query.username,
            role = %query.role,
            limit,
            offset = query.offset,
            returned = page.len(),
            "Listed subscriptions"
        );

        Ok(page)
    }
}
