//! RenewalDispatcher - Startup, run and drain of the renewal scan loops.
//!
//! ## Lifecycle
//!
//! | Phase | Action | On failure |
//! |-------|--------|------------|
//! | Connecting | connect to the broker, retried | `BrokerUnavailable` |
//! | Provisioning | open a channel declaring both queues | close connection, `BrokerUnavailable` |
//! | Waiting for store | ping the store, retried | close channel and connection, `StoreNotReady` |
//! | Running | one task per horizon | logged per scan |
//! | Draining | join tasks, close channel, close connection | logged, drain completes |
//!
//! Loops are spawned only after every startup phase succeeded, so a failed
//! start never leaves a task behind.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::renewal::{Horizon, RenewalError};
use crate::ports::{Clock, QueueChannel, QueueConnection, QueueConnector, SubscriptionRepository};

use super::retry::RetryPolicy;
use super::scanner::{RenewalQueues, RenewalScanner};

/// Timings and destinations for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    /// Broker connection attempts.
    pub connect: RetryPolicy,

    /// Store readiness checks.
    pub store_readiness: RetryPolicy,

    /// Time between scans of one horizon.
    pub poll_interval: Duration,

    pub queues: RenewalQueues,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            connect: RetryPolicy::new(5, Duration::from_secs(5)),
            store_readiness: RetryPolicy::new(10, Duration::from_secs(3)),
            poll_interval: Duration::from_secs(60 * 60),
            queues: RenewalQueues::default(),
        }
    }
}

/// Builds and starts the renewal scan loops.
pub struct RenewalDispatcher {
    connector: Arc<dyn QueueConnector>,
    repository: Arc<dyn SubscriptionRepository>,
    clock: Arc<dyn Clock>,
    settings: DispatcherSettings,
}

impl RenewalDispatcher {
    pub fn new(
        connector: Arc<dyn QueueConnector>,
        repository: Arc<dyn SubscriptionRepository>,
        clock: Arc<dyn Clock>,
        settings: DispatcherSettings,
    ) -> Self {
        Self {
            connector,
            repository,
            clock,
            settings,
        }
    }

    /// Connect, provision, wait for the store, then spawn both loops.
    ///
    /// The loops stop when `shutdown` turns `true` or its sender is dropped.
    ///
    /// # Errors
    ///
    /// - `BrokerUnavailable` if the broker cannot be reached or the queues
    ///   cannot be declared
    /// - `StoreNotReady` if the store never answers a ping
    pub async fn start(
        &self,
        shutdown: watch::Receiver<bool>,
    ) -> Result<RunningDispatcher, RenewalError> {
        let connection = self.connect().await?;

        let queue_names = self.settings.queues.names();
        let channel = match connection.open_channel(&queue_names).await {
            Ok(channel) => channel,
            Err(e) => {
                tracing::error!(error = %e, "Queue provisioning failed");
                close_connection(connection.as_ref()).await;
                return Err(RenewalError::broker_unavailable(1, e.to_string()));
            }
        };
        tracing::info!(queues = ?queue_names, "Renewal queues declared");

        if let Err(e) = self.wait_for_store().await {
            close_channel(channel.as_ref()).await;
            close_connection(connection.as_ref()).await;
            return Err(e);
        }

        let scanner = Arc::new(RenewalScanner::new(
            self.repository.clone(),
            channel.clone(),
            self.clock.clone(),
            self.settings.queues.clone(),
        ));

        let tasks = Horizon::ALL
            .into_iter()
            .map(|horizon| {
                let scanner = scanner.clone();
                let shutdown = shutdown.clone();
                let poll_interval = self.settings.poll_interval;
                tokio::spawn(async move { scanner.run(horizon, poll_interval, shutdown).await })
            })
            .collect::<Vec<_>>();

        tracing::info!(tasks = tasks.len(), "Renewal dispatcher running");

        Ok(RunningDispatcher {
            connection,
            channel,
            tasks,
        })
    }

    async fn connect(&self) -> Result<Box<dyn QueueConnection>, RenewalError> {
        self.settings
            .connect
            .run("broker connect", || self.connector.connect())
            .await
            .map_err(|e| RenewalError::broker_unavailable(e.attempts, e.last_error.to_string()))
    }

    async fn wait_for_store(&self) -> Result<(), RenewalError> {
        self.settings
            .store_readiness
            .run("store readiness", || self.repository.ping())
            .await
            .map_err(|e| RenewalError::store_not_ready(e.attempts, e.last_error.to_string()))
    }
}

/// Handle on the running loops and the broker resources they share.
pub struct RunningDispatcher {
    connection: Box<dyn QueueConnection>,
    channel: Arc<dyn QueueChannel>,
    tasks: Vec<JoinHandle<()>>,
}

impl RunningDispatcher {
    /// Number of spawned scan loops.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for both loops to stop, then close the channel and connection.
    ///
    /// Call after signalling shutdown. Close failures and task panics are
    /// logged and never stop the drain.
    pub async fn drain(self) {
        for result in join_all(self.tasks).await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Renewal scan task ended abnormally");
            }
        }

        close_channel(self.channel.as_ref()).await;
        close_connection(self.connection.as_ref()).await;

        tracing::info!("Renewal dispatcher drained");
    }
}

async fn close_channel(channel: &dyn QueueChannel) {
    if let Err(e) = channel.close().await {
        tracing::warn!(error = %e, "Failed to close queue channel");
    }
}

async fn close_connection(connection: &dyn QueueConnection) {
    if let Err(e) = connection.close().await {
        tracing::warn!(error = %e, "Failed to close broker connection");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::{InMemoryQueueConnector, InMemorySubscriptionRepository};
    use crate::domain::foundation::{SubscriptionId, Username};
    use crate::domain::subscription::SubscriptionEntry;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
    }

    fn settings(connect_attempts: u32) -> DispatcherSettings {
        DispatcherSettings {
            connect: RetryPolicy::new(connect_attempts, Duration::from_secs(1)),
            store_readiness: RetryPolicy::new(3, Duration::from_secs(1)),
            poll_interval: Duration::from_secs(60),
            queues: RenewalQueues::default(),
        }
    }

    fn dispatcher(
        broker: &InMemoryQueueConnector,
        repo: &Arc<InMemorySubscriptionRepository>,
        connect_attempts: u32,
    ) -> RenewalDispatcher {
        RenewalDispatcher::new(
            Arc::new(broker.clone()),
            repo.clone(),
            Arc::new(FixedClock::on(today())),
            settings(connect_attempts),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn connects_after_transient_failures() {
        let broker = InMemoryQueueConnector::new();
        broker.fail_connects(2);
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let (tx, rx) = watch::channel(false);

        let running = dispatcher(&broker, &repo, 3).start(rx).await.unwrap();

        assert_eq!(broker.connect_attempts(), 3);
        assert_eq!(running.task_count(), 2);

        tx.send(true).unwrap();
        running.drain().await;
        assert_eq!(broker.open_connections(), 0);
        assert_eq!(broker.open_channels(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn broker_unavailable_after_all_attempts_fail() {
        let broker = InMemoryQueueConnector::new();
        broker.fail_connects(3);
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let (_tx, rx) = watch::channel(false);

        let err = dispatcher(&broker, &repo, 3).start(rx).await.err().unwrap();

        assert_eq!(err, RenewalError::broker_unavailable(3, "[BROKER_ERROR] connection refused"));
        assert_eq!(broker.connect_attempts(), 3);
        assert_eq!(broker.open_connections(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn provisioning_failure_closes_connection() {
        let broker = InMemoryQueueConnector::new();
        broker.refuse_channels(true);
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let (_tx, rx) = watch::channel(false);

        let err = dispatcher(&broker, &repo, 3).start(rx).await.err().unwrap();

        assert!(matches!(err, RenewalError::BrokerUnavailable { .. }));
        assert_eq!(broker.open_connections(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn store_not_ready_releases_broker_resources() {
        let broker = InMemoryQueueConnector::new();
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        repo.fail_pings(5);
        let (_tx, rx) = watch::channel(false);

        let err = dispatcher(&broker, &repo, 3).start(rx).await.err().unwrap();

        assert!(matches!(err, RenewalError::StoreNotReady { attempts: 3, .. }));
        assert!(err.is_fatal());
        assert_eq!(broker.open_channels(), 0);
        assert_eq!(broker.open_connections(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn store_becoming_ready_within_budget_starts_loops() {
        let broker = InMemoryQueueConnector::new();
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        repo.fail_pings(2);
        let (tx, rx) = watch::channel(false);

        let running = dispatcher(&broker, &repo, 3).start(rx).await.unwrap();
        assert_eq!(running.task_count(), 2);

        tx.send(true).unwrap();
        running.drain().await;
    }

    #[tokio::test(start_paused = true)]
    async fn running_loops_publish_both_horizons() {
        let broker = InMemoryQueueConnector::new();
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        for (id, offset) in [(1, 0), (2, 1)] {
            repo.insert(SubscriptionEntry {
                id: SubscriptionId::new(id),
                username: Username::new("erin").unwrap(),
                service_name: "Hulu".to_string(),
                price: 100,
                counter_months: 3,
                start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                next_payment_date: today() + chrono::Days::new(offset),
                is_active: true,
            })
            .await;
        }
        let (tx, rx) = watch::channel(false);

        let running = dispatcher(&broker, &repo, 1).start(rx).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        tx.send(true).unwrap();
        running.drain().await;

        assert_eq!(broker.published_to("renewals.due_today").len(), 1);
        assert_eq!(broker.published_to("renewals.due_tomorrow").len(), 1);
    }
}
