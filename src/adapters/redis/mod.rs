//! Redis adapters.
//!
//! - `RedisSubscriptionCache` - Cache port over `GET` / `SET EX` / `DEL`
//! - `RedisQueueConnector` - Renewal queues as Redis lists

mod cache;
mod queue;

pub use cache::RedisSubscriptionCache;
pub use queue::RedisQueueConnector;
