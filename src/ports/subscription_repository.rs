//! Subscription repository port.
//!
//! Durable CRUD and aggregate queries over subscription entries, plus the
//! two queries only the renewal scheduler uses (`find_due_on`, `ping`).
//!
//! # Error contract
//!
//! - Missing rows are reported as `ErrorCode::SubscriptionNotFound` with a
//!   `subscription_id` detail (build it from `SubscriptionError::NotFound`)
//! - Any other failure is `ErrorCode::DatabaseError`

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::{DomainError, SubscriptionId, Username};
use crate::domain::subscription::{NewSubscription, SubscriptionEntry, SumQuery};

/// Repository port for subscription persistence.
///
/// Implementations are shared across tasks without caller-side locking.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a new entry and return its store-assigned id.
    async fn create(&self, subscription: &NewSubscription) -> Result<SubscriptionId, DomainError>;

    /// Fetch one entry.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if no row has this id
    async fn read(&self, id: SubscriptionId) -> Result<SubscriptionEntry, DomainError>;

    /// Replace every mutable column of an existing entry owned by
    /// `entry.username`.
    ///
    /// Returns the number of affected rows; zero means no entry with this id
    /// belongs to that owner.
    async fn update(&self, entry: &SubscriptionEntry) -> Result<u64, DomainError>;

    /// Hard-delete an entry. Returns the number of deleted rows.
    async fn remove(&self, id: SubscriptionId) -> Result<u64, DomainError>;

    /// Page through one owner's entries ordered by id.
    async fn list(
        &self,
        username: &Username,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<SubscriptionEntry>, DomainError>;

    /// Page through every owner's entries ordered by id.
    async fn list_all(&self, limit: u32, offset: u32) -> Result<Vec<SubscriptionEntry>, DomainError>;

    /// Total price of the owner's entries matching the query. Zero when
    /// nothing matches.
    async fn count_sum(&self, query: &SumQuery) -> Result<i64, DomainError>;

    /// Active entries whose next payment date is exactly `date`.
    async fn find_due_on(&self, date: NaiveDate) -> Result<Vec<SubscriptionEntry>, DomainError>;

    /// Cheap readiness check.
    async fn ping(&self) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SubscriptionRepository) {}
    }
}
