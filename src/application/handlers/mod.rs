//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod subscription;

pub use subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, GetSubscriptionHandler,
    GetSubscriptionQuery, ListSubscriptionsHandler, ListSubscriptionsQuery,
    RemoveSubscriptionCommand, RemoveSubscriptionHandler, SubscriptionCachePolicy,
    SubscriptionService, SumSubscriptionsHandler, SumSubscriptionsQuery,
    UpdateSubscriptionCommand, UpdateSubscriptionHandler, DEFAULT_CACHE_TTL,
};
