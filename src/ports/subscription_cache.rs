//! Subscription cache port.
//!
//! A volatile copy of subscription entries keyed by `subscription:<id>`.
//!
//! # Contract
//!
//! - `get` returns `Ok(None)` on a clean miss; `Err` only when the backend
//!   itself failed
//! - `set` is last-writer-wins with an expiration, no locking
//! - `invalidate` is idempotent: removing an absent key is not an error
//!
//! No read-modify-write atomicity is offered.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::domain::foundation::{DomainError, SubscriptionId};
use crate::domain::subscription::SubscriptionEntry;

/// Cache key for a subscription entry.
///
/// The textual form must stay `subscription:<decimal id>` so existing cache
/// contents remain readable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub const SUBSCRIPTION_PREFIX: &'static str = "subscription:";

    pub fn subscription(id: SubscriptionId) -> Self {
        Self(format!("{}{}", Self::SUBSCRIPTION_PREFIX, id.as_i64()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Port for the subscription cache.
#[async_trait]
pub trait SubscriptionCache: Send + Sync {
    /// Look up an entry. `Ok(None)` is a miss.
    async fn get(&self, key: &CacheKey) -> Result<Option<SubscriptionEntry>, DomainError>;

    /// Store an entry with a time-to-live.
    async fn set(
        &self,
        key: &CacheKey,
        entry: &SubscriptionEntry,
        ttl: Duration,
    ) -> Result<(), DomainError>;

    /// Drop an entry.
    async fn invalidate(&self, key: &CacheKey) -> Result<(), DomainError>;
}
