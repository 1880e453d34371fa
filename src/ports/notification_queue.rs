//! Notification queue ports.
//!
//! The renewal dispatcher talks to the broker through three narrow handles:
//!
//! ```text
//! QueueConnector --connect()--> QueueConnection --open_channel(queues)--> QueueChannel
//! ```
//!
//! `connect` makes a single attempt; retry policy lives with the caller.
//! Delivery and acknowledgement semantics belong to the broker and are
//! opaque here: a successful `publish` only means the broker accepted the
//! message.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::DomainError;

/// Opens broker connections.
#[async_trait]
pub trait QueueConnector: Send + Sync {
    /// Make one connection attempt.
    async fn connect(&self) -> Result<Box<dyn QueueConnection>, DomainError>;
}

/// An established broker connection, owned by the dispatcher.
#[async_trait]
pub trait QueueConnection: Send + Sync {
    /// Open a channel with the named queues declared on it.
    async fn open_channel(&self, queues: &[String]) -> Result<Arc<dyn QueueChannel>, DomainError>;

    /// Close the connection.
    async fn close(&self) -> Result<(), DomainError>;
}

/// A channel that publishes onto declared queues.
#[async_trait]
pub trait QueueChannel: Send + Sync {
    /// Publish one message onto `queue`.
    ///
    /// # Errors
    ///
    /// - `BrokerError` if the queue was not declared, the channel is closed,
    ///   or the broker rejected the message
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), DomainError>;

    /// Close the channel.
    async fn close(&self) -> Result<(), DomainError>;
}
