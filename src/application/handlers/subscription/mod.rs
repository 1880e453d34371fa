//! Subscription handlers.
//!
//! ## Commands
//! - Creating a subscription (validates the term, warms the cache)
//! - Updating a subscription (full replace, write-through cache)
//! - Removing a subscription (invalidate, delete, invalidate)
//!
//! ## Queries
//! - Reading one subscription (cache-aside)
//! - Listing subscriptions (role scoped, paginated)
//! - Summing prices over a window of months

mod cache_aside;
mod create_subscription;
mod get_subscription;
mod list_subscriptions;
mod remove_subscription;
mod service;
mod sum_subscriptions;
mod update_subscription;

#[cfg(test)]
mod test_support;

pub use cache_aside::{SubscriptionCachePolicy, DEFAULT_CACHE_TTL};
pub use service::SubscriptionService;

// Commands
pub use create_subscription::{CreateSubscriptionCommand, CreateSubscriptionHandler};
pub use remove_subscription::{RemoveSubscriptionCommand, RemoveSubscriptionHandler};
pub use update_subscription::{UpdateSubscriptionCommand, UpdateSubscriptionHandler};

// Queries
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery};
pub use list_subscriptions::{
    ListSubscriptionsHandler, ListSubscriptionsQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use sum_subscriptions::{SumSubscriptionsHandler, SumSubscriptionsQuery};
