//! In-memory subscription repository.
//!
//! Backs the integration tests and local runs without PostgreSQL. Besides the
//! port itself it exposes call counters and failure switches so tests can
//! observe cache transparency and simulate an unavailable store.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, SubscriptionId, Username};
use crate::domain::subscription::{NewSubscription, SubscriptionEntry, SubscriptionError, SumQuery};
use crate::ports::SubscriptionRepository;

/// In-memory implementation of `SubscriptionRepository`.
#[derive(Debug)]
pub struct InMemorySubscriptionRepository {
    entries: RwLock<BTreeMap<SubscriptionId, SubscriptionEntry>>,
    next_id: AtomicI64,
    reads: AtomicUsize,
    writes: AtomicUsize,
    unavailable: AtomicBool,
    ping_failures_left: AtomicU32,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
            ping_failures_left: AtomicU32::new(0),
        }
    }

    /// Make every call fail with a database error until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Fail the next `count` readiness checks.
    pub fn fail_pings(&self, count: u32) {
        self.ping_failures_left.store(count, Ordering::SeqCst);
    }

    /// Number of `read` calls that reached the store.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of successful mutations (create, update, remove).
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Insert an entry as-is, bypassing validation. For seeding test data.
    pub async fn insert(&self, entry: SubscriptionEntry) {
        self.next_id
            .fetch_max(entry.id.as_i64() + 1, Ordering::SeqCst);
        self.entries.write().await.insert(entry.id, entry);
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::database("in-memory store switched off"));
        }
        Ok(())
    }
}

impl Default for InMemorySubscriptionRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn page(entries: impl Iterator<Item = SubscriptionEntry>, limit: u32, offset: u32) -> Vec<SubscriptionEntry> {
    entries.skip(offset as usize).take(limit as usize).collect()
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(&self, subscription: &NewSubscription) -> Result<SubscriptionId, DomainError> {
        self.check_available()?;
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.entries
            .write()
            .await
            .insert(id, subscription.clone().with_id(id));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn read(&self, id: SubscriptionId) -> Result<SubscriptionEntry, DomainError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.entries
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| SubscriptionError::not_found(id).into())
    }

    async fn update(&self, entry: &SubscriptionEntry) -> Result<u64, DomainError> {
        self.check_available()?;
        let mut entries = self.entries.write().await;
        match entries.get_mut(&entry.id) {
            Some(existing) if existing.is_owned_by(&entry.username) => {
                *existing = entry.clone();
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn remove(&self, id: SubscriptionId) -> Result<u64, DomainError> {
        self.check_available()?;
        let removed = self.entries.write().await.remove(&id);
        if removed.is_some() {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(u64::from(removed.is_some()))
    }

    async fn list(
        &self,
        username: &Username,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<SubscriptionEntry>, DomainError> {
        self.check_available()?;
        let entries = self.entries.read().await;
        Ok(page(
            entries.values().filter(|e| e.is_owned_by(username)).cloned(),
            limit,
            offset,
        ))
    }

    async fn list_all(&self, limit: u32, offset: u32) -> Result<Vec<SubscriptionEntry>, DomainError> {
        self.check_available()?;
        let entries = self.entries.read().await;
        Ok(page(entries.values().cloned(), limit, offset))
    }

    async fn count_sum(&self, query: &SumQuery) -> Result<i64, DomainError> {
        self.check_available()?;
        let entries = self.entries.read().await;
        entries
            .values()
            .filter(|e| e.is_owned_by(&query.username))
            .filter(|e| query.matches_service(&e.service_name))
            .filter(|e| query.window.contains(e.start_date))
            .try_fold(0i64, |total, e| total.checked_add(e.price))
            .ok_or_else(|| DomainError::database("price sum overflows i64"))
    }

    async fn find_due_on(&self, date: NaiveDate) -> Result<Vec<SubscriptionEntry>, DomainError> {
        self.check_available()?;
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .filter(|e| e.is_active && e.next_payment_date == date)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.check_available()?;
        let left = self.ping_failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.ping_failures_left.store(left - 1, Ordering::SeqCst);
            return Err(DomainError::database("store still starting up"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::subscription::SumWindow;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn user(name: &str) -> Username {
        Username::new(name).unwrap()
    }

    fn new_sub(owner: &str, service: &str, price: i64, start: NaiveDate) -> NewSubscription {
        NewSubscription {
            username: user(owner),
            service_name: service.to_string(),
            price,
            counter_months: 1,
            start_date: start,
            next_payment_date: start,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let repo = InMemorySubscriptionRepository::new();
        let a = repo.create(&new_sub("a", "X", 1, date(2025, 1, 1))).await.unwrap();
        let b = repo.create(&new_sub("a", "X", 1, date(2025, 1, 1))).await.unwrap();
        assert!(b > a);
    }

    #[tokio::test]
    async fn read_missing_reports_not_found_with_id() {
        let repo = InMemorySubscriptionRepository::new();
        let err = repo.read(SubscriptionId::new(5)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SubscriptionNotFound);
        assert_eq!(err.details.get("subscription_id"), Some(&"5".to_string()));
    }

    #[tokio::test]
    async fn update_and_remove_report_affected_rows() {
        let repo = InMemorySubscriptionRepository::new();
        let id = repo.create(&new_sub("a", "X", 1, date(2025, 1, 1))).await.unwrap();

        let mut entry = repo.read(id).await.unwrap();
        entry.price = 50;
        assert_eq!(repo.update(&entry).await.unwrap(), 1);
        assert_eq!(repo.read(id).await.unwrap().price, 50);

        assert_eq!(repo.remove(id).await.unwrap(), 1);
        assert_eq!(repo.remove(id).await.unwrap(), 0);
        entry.id = SubscriptionId::new(999);
        assert_eq!(repo.update(&entry).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_leaves_other_owners_rows_alone() {
        let repo = InMemorySubscriptionRepository::new();
        let id = repo.create(&new_sub("a", "X", 1, date(2025, 1, 1))).await.unwrap();

        let mut takeover = repo.read(id).await.unwrap();
        takeover.username = user("b");
        takeover.price = 9;

        assert_eq!(repo.update(&takeover).await.unwrap(), 0);
        let stored = repo.read(id).await.unwrap();
        assert_eq!(stored.username, user("a"));
        assert_eq!(stored.price, 1);
    }

    #[tokio::test]
    async fn count_sum_respects_owner_service_and_window() {
        let repo = InMemorySubscriptionRepository::new();
        repo.create(&new_sub("a", "X", 100, date(2025, 1, 10))).await.unwrap();
        repo.create(&new_sub("a", "Y", 40, date(2025, 2, 10))).await.unwrap();
        repo.create(&new_sub("a", "X", 7, date(2025, 6, 1))).await.unwrap();
        repo.create(&new_sub("b", "X", 1000, date(2025, 1, 10))).await.unwrap();

        let window = SumWindow {
            from: date(2025, 1, 1),
            to: date(2025, 3, 1),
        };
        let all = SumQuery {
            username: user("a"),
            service_name: None,
            window,
        };
        assert_eq!(repo.count_sum(&all).await.unwrap(), 140);

        let only_x = SumQuery {
            service_name: Some("X".to_string()),
            ..all
        };
        assert_eq!(repo.count_sum(&only_x).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn count_sum_overflow_is_an_error() {
        let repo = InMemorySubscriptionRepository::new();
        repo.create(&new_sub("a", "X", i64::MAX, date(2025, 1, 10))).await.unwrap();
        repo.create(&new_sub("a", "X", 1, date(2025, 1, 11))).await.unwrap();

        let query = SumQuery {
            username: user("a"),
            service_name: None,
            window: SumWindow {
                from: date(2025, 1, 1),
                to: date(2025, 2, 1),
            },
        };
        let err = repo.count_sum(&query).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[tokio::test]
    async fn find_due_on_skips_inactive_entries() {
        let repo = InMemorySubscriptionRepository::new();
        let due = date(2025, 4, 1);
        repo.create(&new_sub("a", "X", 1, due)).await.unwrap();
        let mut inactive = new_sub("a", "Y", 1, due);
        inactive.is_active = false;
        repo.create(&inactive).await.unwrap();

        let found = repo.find_due_on(due).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].service_name, "X");
    }

    #[tokio::test]
    async fn ping_fails_requested_number_of_times() {
        let repo = InMemorySubscriptionRepository::new();
        repo.fail_pings(2);
        assert!(repo.ping().await.is_err());
        assert!(repo.ping().await.is_err());
        assert!(repo.ping().await.is_ok());
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let repo = InMemorySubscriptionRepository::new();
        repo.set_unavailable(true);
        let err = repo.list_all(10, 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(repo.ping().await.is_err());
    }
}
