//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Provides persistent storage for subscription entries using PostgreSQL.
//! The schema lives in `migrations/`.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, SubscriptionId, Username};
use crate::domain::subscription::{NewSubscription, SubscriptionEntry, SubscriptionError, SumQuery};
use crate::ports::SubscriptionRepository;

/// PostgreSQL implementation of the SubscriptionRepository port.
///
/// Uses sqlx for type-safe database operations with connection pooling.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    /// Creates a new PostgresSubscriptionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending schema migrations.
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to run migrations: {}", e)))
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: i64,
    username: String,
    service_name: String,
    price: i64,
    counter_months: i32,
    start_date: NaiveDate,
    next_payment_date: NaiveDate,
    is_active: bool,
}

impl TryFrom<SubscriptionRow> for SubscriptionEntry {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let counter_months = u32::try_from(row.counter_months).map_err(|_| {
            DomainError::database(format!(
                "Invalid counter_months {} on subscription {}",
                row.counter_months, row.id
            ))
        })?;
        let username = Username::new(row.username).map_err(|e| {
            DomainError::database(format!("Invalid username on subscription {}: {}", row.id, e))
        })?;

        Ok(SubscriptionEntry {
            id: SubscriptionId::new(row.id),
            username,
            service_name: row.service_name,
            price: row.price,
            counter_months,
            start_date: row.start_date,
            next_payment_date: row.next_payment_date,
            is_active: row.is_active,
        })
    }
}

fn months_column(months: u32) -> Result<i32, DomainError> {
    i32::try_from(months)
        .map_err(|_| DomainError::validation("counter_months", "Month counter is too large"))
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, username, service_name, price, counter_months,
           start_date, next_payment_date, is_active
    FROM subscriptions
"#;

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn create(&self, subscription: &NewSubscription) -> Result<SubscriptionId, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO subscriptions (
                username, service_name, price, counter_months,
                start_date, next_payment_date, is_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(subscription.username.as_str())
        .bind(&subscription.service_name)
        .bind(subscription.price)
        .bind(months_column(subscription.counter_months)?)
        .bind(subscription.start_date)
        .bind(subscription.next_payment_date)
        .bind(subscription.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to create subscription: {}", e)))?;

        Ok(SubscriptionId::new(id))
    }

    async fn read(&self, id: SubscriptionId) -> Result<SubscriptionEntry, DomainError> {
        let row: Option<SubscriptionRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::database(format!("Failed to read subscription: {}", e))
                        .with_detail("subscription_id", id.to_string())
                })?;

        match row {
            Some(row) => SubscriptionEntry::try_from(row),
            None => Err(SubscriptionError::not_found(id).into()),
        }
    }

    async fn update(&self, entry: &SubscriptionEntry) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                username = $2,
                service_name = $3,
                price = $4,
                counter_months = $5,
                start_date = $6,
                next_payment_date = $7,
                is_active = $8,
                updated_at = NOW()
            WHERE id = $1 AND username = $2
            "#,
        )
        .bind(entry.id.as_i64())
        .bind(entry.username.as_str())
        .bind(&entry.service_name)
        .bind(entry.price)
        .bind(months_column(entry.counter_months)?)
        .bind(entry.start_date)
        .bind(entry.next_payment_date)
        .bind(entry.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update subscription: {}", e)))?;

        Ok(result.rows_affected())
    }

    async fn remove(&self, id: SubscriptionId) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to delete subscription: {}", e)))?;

        Ok(result.rows_affected())
    }

    async fn list(
        &self,
        username: &Username,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<SubscriptionEntry>, DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            "{} WHERE username = $1 ORDER BY id LIMIT $2 OFFSET $3",
            SELECT_COLUMNS
        ))
        .bind(username.as_str())
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list subscriptions: {}", e)))?;

        rows.into_iter().map(SubscriptionEntry::try_from).collect()
    }

    async fn list_all(&self, limit: u32, offset: u32) -> Result<Vec<SubscriptionEntry>, DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            "{} ORDER BY id LIMIT $1 OFFSET $2",
            SELECT_COLUMNS
        ))
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list subscriptions: {}", e)))?;

        rows.into_iter().map(SubscriptionEntry::try_from).collect()
    }

    async fn count_sum(&self, query: &SumQuery) -> Result<i64, DomainError> {
        let sum: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(price), 0)::BIGINT
            FROM subscriptions
            WHERE username = $1
              AND ($2::TEXT IS NULL OR service_name = $2)
              AND start_date BETWEEN $3 AND $4
            "#,
        )
        .bind(query.username.as_str())
        .bind(query.service_name.as_deref())
        .bind(query.window.from)
        .bind(query.window.to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to sum subscriptions: {}", e)))?;

        Ok(sum)
    }

    async fn find_due_on(&self, date: NaiveDate) -> Result<Vec<SubscriptionEntry>, DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            "{} WHERE is_active AND next_payment_date = $1 ORDER BY id",
            SELECT_COLUMNS
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to find subscriptions due on {}: {}", date, e))
        })?;

        rows.into_iter().map(SubscriptionEntry::try_from).collect()
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::database(format!("Store not reachable: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    fn row() -> SubscriptionRow {
        SubscriptionRow {
            id: 8,
            username: "erin".to_string(),
            service_name: "Spotify".to_string(),
            price: 169,
            counter_months: 3,
            start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            next_payment_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            is_active: true,
        }
    }

    #[test]
    fn row_converts_to_entry() {
        let entry = SubscriptionEntry::try_from(row()).unwrap();
        assert_eq!(entry.id, SubscriptionId::new(8));
        assert_eq!(entry.username.as_str(), "erin");
        assert_eq!(entry.counter_months, 3);
    }

    #[test]
    fn negative_month_counter_is_a_database_error() {
        let bad = SubscriptionRow {
            counter_months: -1,
            ..row()
        };
        let err = SubscriptionEntry::try_from(bad).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn blank_username_is_a_database_error() {
        let bad = SubscriptionRow {
            username: String::new(),
            ..row()
        };
        assert!(SubscriptionEntry::try_from(bad).is_err());
    }

    #[test]
    fn oversized_month_counter_is_rejected_before_binding() {
        assert!(months_column(u32::MAX).is_err());
        assert_eq!(months_column(12).unwrap(), 12);
    }
}
