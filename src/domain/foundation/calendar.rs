//! Calendar arithmetic on plain dates.
//!
//! Subscriptions are billed in calendar months, not 30-day blocks, so month
//! offsets go through chrono's `Months` which clamps to the end of shorter
//! months (Jan 31 + 1 month = Feb 28 or 29).

use chrono::{Days, Months, NaiveDate};

use super::ValidationError;

/// Adds whole calendar months to a date.
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate, ValidationError> {
    date.checked_add_months(Months::new(months)).ok_or_else(|| {
        ValidationError::invalid_format(
            "counter_months",
            format!("{} + {} months is out of range", date, months),
        )
    })
}

/// Adds whole days to a date.
pub fn add_days(date: NaiveDate, days: u32) -> Result<NaiveDate, ValidationError> {
    date.checked_add_days(Days::new(u64::from(days))).ok_or_else(|| {
        ValidationError::invalid_format("date", format!("{} + {} days is out of range", date, days))
    })
}
