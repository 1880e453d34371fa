//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, roles, calendar math, errors)
//! - `subscription` - Subscription entries, terms and price aggregation
//! - `renewal` - Renewal horizons and notification events

pub mod foundation;
pub mod renewal;
pub mod subscription;
