//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, roles, calendar helpers and error types
//! that form the vocabulary of the subscription tracker.

mod calendar;
mod errors;
mod ids;

pub use calendar::{add_days, add_months};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{Role, SubscriptionId, Username};
