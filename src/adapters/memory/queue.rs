//! In-memory notification queue.
//!
//! Records every published message per queue and can be told to refuse
//! connections, channels or publishes, which is how the dispatcher's retry
//! and cleanup paths are tested.
//!
//! # Panics
//!
//! Accessors panic if the internal lock is poisoned. Test use only.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::foundation::DomainError;
use crate::ports::{QueueChannel, QueueConnection, QueueConnector};

/// A message accepted by the in-memory broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub queue: String,
    pub payload: Vec<u8>,
}

impl PublishedMessage {
    /// Decode the payload as JSON.
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.payload)
    }
}

#[derive(Debug, Default)]
struct BrokerState {
    published: Mutex<Vec<PublishedMessage>>,
    connect_attempts: AtomicU32,
    connect_failures_left: AtomicU32,
    refuse_channels: AtomicBool,
    publish_failures_left: AtomicU32,
    open_connections: AtomicUsize,
    open_channels: AtomicUsize,
}

impl BrokerState {
    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

/// In-memory implementation of `QueueConnector`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQueueConnector {
    state: Arc<BrokerState>,
}

impl InMemoryQueueConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse the next `count` connection attempts.
    pub fn fail_connects(&self, count: u32) {
        self.state.connect_failures_left.store(count, Ordering::SeqCst);
    }

    /// Refuse to open channels (queue declaration failure).
    pub fn refuse_channels(&self, refuse: bool) {
        self.state.refuse_channels.store(refuse, Ordering::SeqCst);
    }

    /// Reject the next `count` publishes.
    pub fn fail_publishes(&self, count: u32) {
        self.state.publish_failures_left.store(count, Ordering::SeqCst);
    }

    pub fn connect_attempts(&self) -> u32 {
        self.state.connect_attempts.load(Ordering::SeqCst)
    }

    /// Connections opened and not yet closed.
    pub fn open_connections(&self) -> usize {
        self.state.open_connections.load(Ordering::SeqCst)
    }

    /// Channels opened and not yet closed.
    pub fn open_channels(&self) -> usize {
        self.state.open_channels.load(Ordering::SeqCst)
    }

    pub fn published(&self) -> Vec<PublishedMessage> {
        self.state
            .published
            .lock()
            .expect("InMemoryQueueConnector: published lock poisoned")
            .clone()
    }

    pub fn published_to(&self, queue: &str) -> Vec<PublishedMessage> {
        self.published()
            .into_iter()
            .filter(|m| m.queue == queue)
            .collect()
    }
}

#[async_trait]
impl QueueConnector for InMemoryQueueConnector {
    async fn connect(&self) -> Result<Box<dyn QueueConnection>, DomainError> {
        self.state.connect_attempts.fetch_add(1, Ordering::SeqCst);
        if BrokerState::take_failure(&self.state.connect_failures_left) {
            return Err(DomainError::broker("connection refused"));
        }
        self.state.open_connections.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryQueueConnection {
            state: Arc::clone(&self.state),
            closed: AtomicBool::new(false),
        }))
    }
}

struct InMemoryQueueConnection {
    state: Arc<BrokerState>,
    closed: AtomicBool,
}

#[async_trait]
impl QueueConnection for InMemoryQueueConnection {
    async fn open_channel(&self, queues: &[String]) -> Result<Arc<dyn QueueChannel>, DomainError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DomainError::broker("connection is closed"));
        }
        if self.state.refuse_channels.load(Ordering::SeqCst) {
            return Err(DomainError::broker("queue declaration refused"));
        }
        self.state.open_channels.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(InMemoryQueueChannel {
            state: Arc::clone(&self.state),
            declared: queues.iter().cloned().collect(),
            closed: AtomicBool::new(false),
        }))
    }

    async fn close(&self) -> Result<(), DomainError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.state.open_connections.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

struct InMemoryQueueChannel {
    state: Arc<BrokerState>,
    declared: HashSet<String>,
    closed: AtomicBool,
}

#[async_trait]
impl QueueChannel for InMemoryQueueChannel {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), DomainError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DomainError::broker("channel is closed"));
        }
        if !self.declared.contains(queue) {
            return Err(DomainError::broker(format!("queue '{}' was not declared", queue)));
        }
        if BrokerState::take_failure(&self.state.publish_failures_left) {
            return Err(DomainError::broker("publish rejected"));
        }
        self.state
            .published
            .lock()
            .expect("InMemoryQueueConnector: published lock poisoned")
            .push(PublishedMessage {
                queue: queue.to_string(),
                payload: payload.to_vec(),
            });
        Ok(())
    }

    async fn close(&self) -> Result<(), DomainError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.state.open_channels.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
