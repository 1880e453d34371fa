//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSubscriptionRepository` - Subscription store, aggregates and due-date scans

mod subscription_repository;

pub use subscription_repository::PostgresSubscriptionRepository;
