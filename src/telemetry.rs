//! Tracing subscriber setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ServiceConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Output is JSON in production
/// or when `log_format = json`, human-readable otherwise. A second call is a
/// no-op.
pub fn init_tracing(service: &ServiceConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&service.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    let _ = if service.json_logs() {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };
}
