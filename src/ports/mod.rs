//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `SubscriptionRepository` - Durable subscription store
//! - `SubscriptionCache` - Volatile cache in front of the store
//!
//! ## Messaging Ports
//!
//! - `QueueConnector` / `QueueConnection` / `QueueChannel` - Renewal notification queues
//!
//! ## Time
//!
//! - `Clock` - Source of "today"

mod clock;
mod notification_queue;
mod subscription_cache;
mod subscription_repository;

pub use clock::Clock;
pub use notification_queue::{QueueChannel, QueueConnection, QueueConnector};
pub use subscription_cache::{CacheKey, SubscriptionCache};
pub use subscription_repository::SubscriptionRepository;
