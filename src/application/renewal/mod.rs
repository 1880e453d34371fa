//! Renewal scheduling.
//!
//! `RenewalDispatcher` brings up the broker and store, then runs one
//! `RenewalScanner` loop per horizon until shutdown.

mod dispatcher;
mod retry;
mod scanner;

pub use dispatcher::{DispatcherSettings, RenewalDispatcher, RunningDispatcher};
pub use retry::{Exhausted, RetryPolicy};
pub use scanner::{
    RenewalQueues, RenewalScanner, ScanReport, DEFAULT_DUE_TODAY_QUEUE, DEFAULT_DUE_TOMORROW_QUEUE,
    MIN_POLL_INTERVAL,
};
