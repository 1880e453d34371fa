//! Subscription domain module.
//!
//! Subscription entries, the terms derived from a create/update request,
//! the price aggregation filter and the lifecycle errors.

mod entry;
mod errors;
mod filter;

pub use entry::{
    parse_start_date, NewSubscription, SubscriptionEntry, SubscriptionRequest, SubscriptionTerms,
    PAYMENT_INTERVAL_MONTHS,
};
pub use errors::SubscriptionError;
pub use filter::{FilterSum, SumQuery, SumWindow};
