//! Renewal scheduler errors.

use thiserror::Error;

use crate::domain::foundation::SubscriptionId;

/// Failures of the renewal scanner and dispatcher.
///
/// `BrokerUnavailable` and `StoreNotReady` abort startup; `PublishFailed` is
/// reported per entry and never stops a scan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenewalError {
    #[error("Message broker unavailable after {attempts} attempt(s): {reason}")]
    BrokerUnavailable { attempts: u32, reason: String },

    #[error("Subscription store not ready after {attempts} attempt(s): {reason}")]
    StoreNotReady { attempts: u32, reason: String },

    #[error("Failed to publish renewal of subscription {subscription_id} to '{queue}': {reason}")]
    PublishFailed {
        subscription_id: SubscriptionId,
        queue: String,
        reason: String,
    },
}

impl RenewalError {
    pub fn broker_unavailable(attempts: u32, reason: impl Into<String>) -> Self {
        RenewalError::BrokerUnavailable {
            attempts,
            reason: reason.into(),
        }
    }

    pub fn store_not_ready(attempts: u32, reason: impl Into<String>) -> Self {
        RenewalError::StoreNotReady {
            attempts,
            reason: reason.into(),
        }
    }

    pub fn publish_failed(
        subscription_id: SubscriptionId,
        queue: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        RenewalError::PublishFailed {
            subscription_id,
            queue: queue.into(),
            reason: reason.into(),
        }
    }

    /// Startup errors end the scheduler process.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, RenewalError::PublishFailed { .. })
    }
}
