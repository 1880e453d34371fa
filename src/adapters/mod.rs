//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - Durable subscription store (sqlx)
//! - `redis` - Subscription cache and renewal queues
//! - `memory` - In-memory doubles for tests and local runs
//! - `clock` - System and fixed clocks

pub mod clock;
pub mod memory;
pub mod postgres;
pub mod redis;

pub use self::clock::{FixedClock, SystemClock};
pub use self::memory::{
    InMemoryQueueConnector, InMemorySubscriptionCache, InMemorySubscriptionRepository,
    PublishedMessage,
};
pub use self::postgres::PostgresSubscriptionRepository;
pub use self::redis::{RedisQueueConnector, RedisSubscriptionCache};
