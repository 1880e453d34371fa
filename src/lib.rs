//! Subscription Tracker - recurring subscription bookkeeping.
//!
//! Users register subscriptions (service, monthly price, term). Reads go
//! through a cache in front of the store, and a background scheduler
//! publishes a notification for every active subscription whose next
//! payment is due today or tomorrow.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
