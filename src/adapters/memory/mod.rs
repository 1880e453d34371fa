//! In-memory adapters.
//!
//! Deterministic implementations of the storage and messaging ports for
//! tests and local development. They are not meant for production.

mod cache;
mod queue;
mod repository;

pub use cache::InMemorySubscriptionCache;
pub use queue::{InMemoryQueueConnector, PublishedMessage};
pub use repository::InMemorySubscriptionRepository;
