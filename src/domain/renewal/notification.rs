//! Renewal notification events.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::foundation::{add_days, SubscriptionId, Username, ValidationError};
use crate::domain::subscription::SubscriptionEntry;

/// Relative day a scan loop is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    DueToday,
    DueTomorrow,
}

impl Horizon {
    /// Both horizons, in the order their loops are started.
    pub const ALL: [Horizon; 2] = [Horizon::DueTomorrow, Horizon::DueToday];

    /// Days between today and the payment date this horizon looks for.
    pub fn offset_days(&self) -> u32 {
        match self {
            Horizon::DueToday => 0,
            Horizon::DueTomorrow => 1,
        }
    }

    /// Payment date this horizon targets relative to `today`.
    pub fn target_date(&self, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
        add_days(today, self.offset_days())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Horizon::DueToday => "due_today",
            Horizon::DueTomorrow => "due_tomorrow",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Message published for each subscription due on a horizon's target date.
///
/// Scans are poll-based, so the same subscription can be announced more
/// than once per day; `event_id` is unique per publish and consumers
/// deduplicate on `(subscription_id, next_payment_date, horizon)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalNotification {
    pub event_id: Uuid,
    pub subscription_id: SubscriptionId,
    pub username: Username,
    pub service_name: String,
    pub price: i64,
    pub next_payment_date: NaiveDate,
    pub horizon: Horizon,
    pub detected_at: DateTime<Utc>,
}

impl RenewalNotification {
    pub fn for_entry(entry: &SubscriptionEntry, horizon: Horizon, detected_at: DateTime<Utc>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            subscription_id: entry.id,
            username: entry.username.clone(),
            service_name: entry.service_name.clone(),
            price: entry.price,
            next_payment_date: entry.next_payment_date,
            horizon,
            detected_at,
        }
    }

    /// Wire payload.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
