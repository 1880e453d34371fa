//! Application layer - Commands, Queries, Handlers and background services.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Request handlers live in `handlers`; the renewal scheduler in `renewal`.

pub mod handlers;
pub mod renewal;

pub use handlers::{SubscriptionCachePolicy, SubscriptionService};
pub use renewal::{DispatcherSettings, RenewalDispatcher, RunningDispatcher};
