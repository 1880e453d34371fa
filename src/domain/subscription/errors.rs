//! Subscription-specific error types.
//!
//! # Client vs server mapping
//!
//! | Error | Side |
//! |-------|------|
//! | InvalidTerm | client |
//! | NotFound | client |
//! | ValidationFailed | client |
//! | StoreUnavailable | server |
//! | CacheUnavailable | server |

use chrono::NaiveDate;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, ValidationError};

/// Errors surfaced by the subscription lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The term would already be over: end date is before today.
    InvalidTerm { end_date: NaiveDate, today: NaiveDate },

    /// No subscription with this id in the store.
    NotFound(SubscriptionId),

    /// Request failed the service's own input checks.
    ValidationFailed { field: String, message: String },

    /// Repository call failed.
    StoreUnavailable(String),

    /// Cache backend failed on a read path.
    CacheUnavailable(String),
}

impl SubscriptionError {
    pub fn invalid_term(end_date: NaiveDate, today: NaiveDate) -> Self {
        SubscriptionError::InvalidTerm { end_date, today }
    }

    pub fn not_found(id: SubscriptionId) -> Self {
        SubscriptionError::NotFound(id)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        SubscriptionError::StoreUnavailable(message.into())
    }

    pub fn cache_unavailable(message: impl Into<String>) -> Self {
        SubscriptionError::CacheUnavailable(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::InvalidTerm { .. } => ErrorCode::InvalidTerm,
            SubscriptionError::NotFound(_) => ErrorCode::SubscriptionNotFound,
            SubscriptionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SubscriptionError::StoreUnavailable(_) => ErrorCode::DatabaseError,
            SubscriptionError::CacheUnavailable(_) => ErrorCode::CacheError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            SubscriptionError::InvalidTerm { end_date, today } => format!(
                "Subscription term ends on {}, which is before today ({})",
                end_date, today
            ),
            SubscriptionError::NotFound(id) => format!("Subscription not found: {}", id),
            SubscriptionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SubscriptionError::StoreUnavailable(msg) => format!("Store unavailable: {}", msg),
            SubscriptionError::CacheUnavailable(msg) => format!("Cache unavailable: {}", msg),
        }
    }

    /// True when the caller caused the failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SubscriptionError::InvalidTerm { .. }
                | SubscriptionError::NotFound(_)
                | SubscriptionError::ValidationFailed { .. }
        )
    }
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SubscriptionError {}

impl From<ValidationError> for SubscriptionError {
    fn from(err: ValidationError) -> Self {
        SubscriptionError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

/// Repository and cache adapters report through `DomainError`; a not-found
/// error carries the id in its `subscription_id` detail.
impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::SubscriptionNotFound => {
                match err
                    .details
                    .get("subscription_id")
                    .and_then(|id| id.parse::<SubscriptionId>().ok())
                {
                    Some(id) => SubscriptionError::NotFound(id),
                    None => SubscriptionError::StoreUnavailable(err.to_string()),
                }
            }
            ErrorCode::ValidationFailed => SubscriptionError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::CacheError => SubscriptionError::CacheUnavailable(err.to_string()),
            _ => SubscriptionError::StoreUnavailable(err.to_string()),
        }
    }
}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        let domain = DomainError::new(err.code(), err.message());
        match err {
            SubscriptionError::NotFound(id) => domain.with_detail("subscription_id", id.to_string()),
            SubscriptionError::ValidationFailed { field, .. } => domain.with_detail("field", field),
            _ => domain,
        }
    }
}
