//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SUBSCRIPTION_TRACKER` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use subscription_tracker::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Scanning every {:?}", config.scheduler.poll_interval());
//! ```

mod cache;
mod database;
mod error;
mod queue;
mod scheduler;
mod service;

pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use queue::QueueConfig;
pub use scheduler::SchedulerConfig;
pub use service::{Environment, ServiceConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Environment and logging
    #[serde(default)]
    pub service: ServiceConfig,

    /// Subscription store (PostgreSQL)
    pub database: DatabaseConfig,

    /// Subscription cache (Redis), absent for scheduler-only deployments
    #[serde(default)]
    pub cache: Option<CacheConfig>,

    /// Renewal notification broker (Redis lists)
    pub queue: QueueConfig,

    /// Renewal scan timing
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SUBSCRIPTION_TRACKER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SUBSCRIPTION_TRACKER__DATABASE__URL=...` -> `database.url = ...`
    /// - `SUBSCRIPTION_TRACKER__QUEUE__MAX_RETRIES=5` -> `queue.max_retries = 5`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SUBSCRIPTION_TRACKER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Performs semantic validation of configuration:
    /// - URL schemes
    /// - Pool size constraints
    /// - Non-zero retry counts, TTLs and intervals
    /// - Distinct queue names
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.service.validate()?;
        self.database.validate()?;
        if let Some(cache) = &self.cache {
            cache.validate()?;
        }
        self.queue.validate()?;
        self.scheduler.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.service.is_production()
    }
}
