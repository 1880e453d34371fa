//! Clock port.
//!
//! "Today" drives both the term check on create/update and the renewal
//! horizons, so it is injected rather than read from the system directly.

use chrono::{DateTime, NaiveDate, Utc};

/// Source of the current date and time.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date in UTC.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
