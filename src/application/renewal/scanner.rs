//! RenewalScanner - Finds subscriptions due on a horizon and publishes them.
//!
//! One scanner is shared by both horizon loops. Each tick:
//!
//! 1. `target = today + horizon offset`
//! 2. load active subscriptions whose next payment falls on `target`
//! 3. publish one notification per match to the horizon's queue
//!
//! A publish failure is logged and skipped. A failed store query is logged
//! and retried on the next tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::watch;
use tokio::time;

use crate::domain::foundation::DomainError;
use crate::domain::renewal::{Horizon, RenewalError, RenewalNotification};
use crate::domain::subscription::SubscriptionEntry;
use crate::ports::{Clock, QueueChannel, SubscriptionRepository};

/// Queue name used for subscriptions due today.
pub const DEFAULT_DUE_TODAY_QUEUE: &str = "renewals.due_today";

/// Queue name used for subscriptions due tomorrow.
pub const DEFAULT_DUE_TOMORROW_QUEUE: &str = "renewals.due_tomorrow";

/// Shortest period between scans. `tokio::time::interval` rejects zero.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Destination queue for each horizon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalQueues {
    pub due_today: String,
    pub due_tomorrow: String,
}

impl Default for RenewalQueues {
    fn default() -> Self {
        Self {
            due_today: DEFAULT_DUE_TODAY_QUEUE.to_string(),
            due_tomorrow: DEFAULT_DUE_TOMORROW_QUEUE.to_string(),
        }
    }
}

impl RenewalQueues {
    pub fn for_horizon(&self, horizon: Horizon) -> &str {
        match horizon {
            Horizon::DueToday => &self.due_today,
            Horizon::DueTomorrow => &self.due_tomorrow,
        }
    }

    /// Every queue name, for declaration on the channel.
    pub fn names(&self) -> Vec<String> {
        vec![self.due_today.clone(), self.due_tomorrow.clone()]
    }
}

/// Outcome of one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub horizon: Horizon,
    pub target_date: NaiveDate,
    pub matched: usize,
    pub published: usize,
    pub failed: usize,
}

/// Scans the store for due subscriptions and publishes notifications.
pub struct RenewalScanner {
    repository: Arc<dyn SubscriptionRepository>,
    channel: Arc<dyn QueueChannel>,
    clock: Arc<dyn Clock>,
    queues: RenewalQueues,
}

impl RenewalScanner {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        channel: Arc<dyn QueueChannel>,
        clock: Arc<dyn Clock>,
        queues: RenewalQueues,
    ) -> Self {
        Self {
            repository,
            channel,
            clock,
            queues,
        }
    }

    pub fn queues(&self) -> &RenewalQueues {
        &self.queues
    }

    /// Run the scan loop for `horizon` until shutdown is signalled.
    ///
    /// The first scan starts immediately; later ones follow `poll_interval`,
    /// raised to [`MIN_POLL_INTERVAL`] if shorter. A closed shutdown sender
    /// also stops the loop.
    pub async fn run(
        &self,
        horizon: Horizon,
        poll_interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        if poll_interval < MIN_POLL_INTERVAL {
            tracing::warn!(
                %horizon,
                requested_ms = poll_interval.as_millis() as u64,
                "Poll interval too short, using the minimum"
            );
        }
        let poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        let mut interval = time::interval(poll_interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        tracing::info!(
            %horizon,
            queue = self.queues.for_horizon(horizon),
            poll_interval_secs = poll_interval.as_secs(),
            "Renewal scan loop started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.scan_once(horizon).await {
                        tracing::error!(%horizon, error = %e, "Renewal scan failed, retrying next tick");
                    }
                }
            }
        }

        tracing::info!(%horizon, "Renewal scan loop stopped");
    }

    /// Run a single scan for `horizon`.
    ///
    /// # Errors
    ///
    /// Returns the store error if the due subscriptions could not be loaded.
    /// Publish failures are counted in the report instead.
    pub async fn scan_once(&self, horizon: Horizon) -> Result<ScanReport, DomainError> {
        let target_date = horizon.target_date(self.clock.today())?;
        let due = self.repository.find_due_on(target_date).await?;

        let mut report = ScanReport {
            horizon,
            target_date,
            matched: due.len(),
            published: 0,
            failed: 0,
        };

        for entry in &due {
            match self.publish(entry, horizon).await {
                Ok(()) => report.published += 1,
                Err(e) => {
                    tracing::warn!(
                        subscription_id = %entry.id,
                        %horizon,
                        error = %e,
                        "Skipping renewal notification"
                    );
                    report.failed += 1;
                }
            }
        }

        if report.matched > 0 {
            tracing::info!(
                %horizon,
                target_date = %report.target_date,
                matched = report.matched,
                published = report.published,
                failed = report.failed,
                "Renewal scan complete"
            );
        } else {
            tracing::debug!(%horizon, target_date = %target_date, "No renewals due");
        }

        Ok(report)
    }

    async fn publish(&self, entry: &SubscriptionEntry, horizon: Horizon) -> Result<(), RenewalError> {
        let queue = self.queues.for_horizon(horizon);
        let notification = RenewalNotification::for_entry(entry, horizon, self.clock.now());

        let payload = notification
            .to_json_bytes()
            .map_err(|e| RenewalError::publish_failed(entry.id, queue, e.to_string()))?;

        self.channel
            .publish(queue, &payload)
            .await
            .map_err(|e| RenewalError::publish_failed(entry.id, queue, e.to_string()))?;

        tracing::debug!(
            subscription_id = %entry.id,
            queue,
            event_id = %notification.event_id,
            "Renewal notification published"
        );
        Ok(())
    }
}
