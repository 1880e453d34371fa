//! Subscription entry and the terms derived from a create/update request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{add_months, SubscriptionId, Username, ValidationError};

use super::SubscriptionError;

/// Billing offset between the start date and the next payment.
pub const PAYMENT_INTERVAL_MONTHS: u32 = 1;

/// Parses a start date given either as `MM-YYYY` (first day of that month)
/// or as an ISO `YYYY-MM-DD` date.
pub fn parse_start_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::empty_field("start_date"));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }

    // chrono cannot parse a date without a day, so MM-YYYY is split by hand.
    if let Some((month, year)) = raw.split_once('-') {
        if month.len() == 2 && year.len() == 4 {
            if let (Ok(month), Ok(year)) = (month.parse::<u32>(), year.parse::<i32>()) {
                if let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) {
                    return Ok(date);
                }
            }
        }
    }

    Err(ValidationError::invalid_format(
        "start_date",
        format!("'{}' is neither MM-YYYY nor YYYY-MM-DD", raw),
    ))
}

/// Create/update request shape.
///
/// Updates use the same shape and replace the whole entry: anything the
/// caller does not resend is recomputed from the request, never merged with
/// the stored row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub service_name: String,
    pub price: i64,
    pub counter_months: u32,
    pub start_date: String,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl SubscriptionRequest {
    pub fn new(
        service_name: impl Into<String>,
        price: i64,
        counter_months: u32,
        start_date: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            price,
            counter_months,
            start_date: start_date.into(),
            is_active: None,
        }
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
}

/// Validated commercial and temporal terms of a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionTerms {
    pub service_name: String,
    pub price: i64,
    pub counter_months: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub next_payment_date: NaiveDate,
    pub is_active: bool,
}

impl SubscriptionTerms {
    /// Validates a request against `today`.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for an empty service name, negative price,
    ///   zero month counter or unparseable start date
    /// - `InvalidTerm` when `start_date + counter_months` is before `today`
    pub fn from_request(
        request: &SubscriptionRequest,
        today: NaiveDate,
    ) -> Result<Self, SubscriptionError> {
        let service_name = request.service_name.trim();
        if service_name.is_empty() {
            return Err(ValidationError::empty_field("service_name").into());
        }
        if request.price < 0 {
            return Err(ValidationError::below_minimum("price", 0, request.price).into());
        }
        if request.counter_months == 0 {
            return Err(ValidationError::below_minimum("counter_months", 1, 0).into());
        }

        let start_date = parse_start_date(&request.start_date)?;
        let end_date = add_months(start_date, request.counter_months)?;
        if end_date < today {
            return Err(SubscriptionError::invalid_term(end_date, today));
        }
        let next_payment_date = add_months(start_date, PAYMENT_INTERVAL_MONTHS)?;

        Ok(Self {
            service_name: service_name.to_string(),
            price: request.price,
            counter_months: request.counter_months,
            start_date,
            end_date,
            next_payment_date,
            is_active: request.is_active.unwrap_or(true),
        })
    }

    /// Entry shape handed to the repository on create.
    pub fn into_new(self, username: Username) -> NewSubscription {
        NewSubscription {
            username,
            service_name: self.service_name,
            price: self.price,
            counter_months: self.counter_months,
            start_date: self.start_date,
            next_payment_date: self.next_payment_date,
            is_active: self.is_active,
        }
    }

    /// Full entry for an id that already exists.
    pub fn into_entry(self, id: SubscriptionId, username: Username) -> SubscriptionEntry {
        self.into_new(username).with_id(id)
    }
}

/// A subscription that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub username: Username,
    pub service_name: String,
    pub price: i64,
    pub counter_months: u32,
    pub start_date: NaiveDate,
    pub next_payment_date: NaiveDate,
    pub is_active: bool,
}

impl NewSubscription {
    pub fn with_id(self, id: SubscriptionId) -> SubscriptionEntry {
        SubscriptionEntry {
            id,
            username: self.username,
            service_name: self.service_name,
            price: self.price,
            counter_months: self.counter_months,
            start_date: self.start_date,
            next_payment_date: self.next_payment_date,
            is_active: self.is_active,
        }
    }
}

/// A persisted subscription. This is also the cached value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionEntry {
    pub id: SubscriptionId,
    pub username: Username,
    pub service_name: String,
    pub price: i64,
    pub counter_months: u32,
    pub start_date: NaiveDate,
    pub next_payment_date: NaiveDate,
    pub is_active: bool,
}

impl SubscriptionEntry {
    /// Last day covered by the term. Computed, never stored.
    pub fn end_date(&self) -> Result<NaiveDate, ValidationError> {
        add_months(self.start_date, self.counter_months)
    }

    pub fn is_owned_by(&self, username: &Username) -> bool {
        &self.username == username
    }
}
