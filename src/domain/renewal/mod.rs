//! Renewal domain module.
//!
//! Horizons ("due today" / "due tomorrow"), the notification event
//! published for each due subscription, and scheduler errors.

mod errors;
mod notification;

pub use errors::RenewalError;
pub use notification::{Horizon, RenewalNotification};
