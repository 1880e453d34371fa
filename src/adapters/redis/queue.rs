//! Redis-backed renewal notification queues.
//!
//! Each named queue is a Redis list; publishing is `RPUSH <queue> <payload>`
//! and downstream consumers pop from the head (`BLPOP`/`LMOVE`). Lists need
//! no declaration, so "declaring" a queue means validating its name and
//! remembering it: publishing to an undeclared queue is refused so a
//! misconfigured name cannot silently create a list nobody reads.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::{QueueChannel, QueueConnection, QueueConnector};

/// Opens Redis connections for the renewal dispatcher.
#[derive(Clone)]
pub struct RedisQueueConnector {
    client: redis::Client,
}

impl RedisQueueConnector {
    /// Validate `url` without connecting.
    pub fn new(url: &str) -> Result<Self, DomainError> {
        let client = redis::Client::open(url)
            .map_err(|e| DomainError::broker(format!("Invalid broker URL: {}", e)))?;
        Ok(Self { client })
    }
}

async fn ping(conn: &mut MultiplexedConnection) -> Result<(), DomainError> {
    redis::cmd("PING")
        .query_async::<_, String>(conn)
        .await
        .map(|_| ())
        .map_err(|e| DomainError::broker(format!("Broker did not answer PING: {}", e)))
}

#[async_trait]
impl QueueConnector for RedisQueueConnector {
    async fn connect(&self) -> Result<Box<dyn QueueConnection>, DomainError> {
        let mut conn = self
            .client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| DomainError::broker(format!("Failed to connect to broker: {}", e)))?;
        ping(&mut conn).await?;

        Ok(Box::new(RedisQueueConnection {
            slot: ConnectionSlot::new(conn),
        }))
    }
}

impl std::fmt::Debug for RedisQueueConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisQueueConnector").finish_non_exhaustive()
    }
}

/// Shared home of one broker socket.
///
/// The connection and all of its channels hold the same slot. Closing takes
/// the handle out, so the socket is dropped as soon as in-flight commands
/// finish with their short-lived clones.
struct ConnectionSlot<C> {
    inner: Arc<RwLock<Option<C>>>,
}

impl<C: Clone> ConnectionSlot<C> {
    fn new(conn: C) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(conn))),
        }
    }

    fn share(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }

    /// A handle for one command, or an error once closed.
    async fn checkout(&self) -> Result<C, DomainError> {
        self.inner
            .read()
            .await
            .clone()
            .ok_or_else(|| DomainError::broker("connection is closed"))
    }

    /// Drop the stored handle. Returns false if it was already gone.
    async fn release(&self) -> bool {
        self.inner.write().await.take().is_some()
    }
}

/// A live broker connection.
struct RedisQueueConnection {
    slot: ConnectionSlot<MultiplexedConnection>,
}

#[async_trait]
impl QueueConnection for RedisQueueConnection {
    async fn open_channel(&self, queues: &[String]) -> Result<Arc<dyn QueueChannel>, DomainError> {
        let mut conn = self.slot.checkout().await?;
        if let Some(bad) = queues.iter().find(|q| q.trim().is_empty()) {
            return Err(DomainError::broker(format!("invalid queue name '{}'", bad)));
        }
        ping(&mut conn).await?;

        Ok(Arc::new(RedisQueueChannel {
            slot: self.slot.share(),
            declared: queues.iter().cloned().collect(),
            closed: AtomicBool::new(false),
        }))
    }

    /// Releases the socket. Channels opened from this connection fail from
    /// here on.
    async fn close(&self) -> Result<(), DomainError> {
        if !self.slot.release().await {
            tracing::debug!("Broker connection already closed");
        }
        Ok(())
    }
}

struct RedisQueueChannel {
    slot: ConnectionSlot<MultiplexedConnection>,
    declared: HashSet<String>,
    closed: AtomicBool,
}

#[async_trait]
impl QueueChannel for RedisQueueChannel {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), DomainError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DomainError::broker("channel is closed"));
        }
        if !self.declared.contains(queue) {
            return Err(DomainError::broker(format!("queue '{}' was not declared", queue)));
        }

        let mut conn = self.slot.checkout().await?;
        conn.rpush::<_, _, ()>(queue, payload)
            .await
            .map_err(|e: redis::RedisError| DomainError::broker(e.to_string()))?;

        Ok(())
    }

    /// Channels share the connection's socket; closing one only stops it
    /// from publishing.
    async fn close(&self) -> Result<(), DomainError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
