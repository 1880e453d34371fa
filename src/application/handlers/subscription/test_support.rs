//! Fixtures shared by the subscription handler tests.

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::clock::FixedClock;
use crate::adapters::memory::{InMemorySubscriptionCache, InMemorySubscriptionRepository};
use crate::domain::foundation::Username;
use crate::domain::subscription::SubscriptionRequest;

use super::SubscriptionCachePolicy;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
}

pub fn user(name: &str) -> Username {
    Username::new(name).unwrap()
}

/// Six-month Netflix term starting this month.
pub fn current_request() -> SubscriptionRequest {
    SubscriptionRequest::new("Netflix", 799, 6, "07-2025")
}

/// Term that ended before `today()`.
pub fn lapsed_request() -> SubscriptionRequest {
    SubscriptionRequest::new("Netflix", 799, 1, "01-2025")
}

pub struct Fixture {
    pub repo: Arc<InMemorySubscriptionRepository>,
    pub cache: Arc<InMemorySubscriptionCache>,
    pub clock: Arc<FixedClock>,
    pub policy: SubscriptionCachePolicy,
}

impl Fixture {
    pub fn new() -> Self {
        let cache = Arc::new(InMemorySubscriptionCache::new());
        Self {
            repo: Arc::new(InMemorySubscriptionRepository::new()),
            policy: SubscriptionCachePolicy::new(cache.clone(), Duration::from_secs(300)),
            cache,
            clock: Arc::new(FixedClock::on(today())),
        }
    }
}
