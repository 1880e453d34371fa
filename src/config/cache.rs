//! Cache configuration
//!
//! Only processes that serve lifecycle operations need this section; the
//! renewal scheduler never reads through the cache.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use subscription_tracker::config::AppConfig;
//! # use subscription_tracker::ports::SubscriptionRepository;
//! # async fn wire(
//! #     config: AppConfig,
//! #     repository: Arc<dyn SubscriptionRepository>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! use subscription_tracker::adapters::{RedisSubscriptionCache, SystemClock};
//! use subscription_tracker::application::SubscriptionService;
//!
//! if let Some(cache) = &config.cache {
//!     let redis = RedisSubscriptionCache::connect(&cache.url, cache.timeout()).await?;
//!     let _service = SubscriptionService::new(
//!         repository,
//!         Arc::new(redis),
//!         Arc::new(SystemClock),
//!         cache.entry_ttl(),
//!     );
//! }
//! # Ok(())
//! # }
//! ```

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Redis-backed subscription cache
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Lifetime of a cached subscription in seconds
    #[serde(default = "default_entry_ttl")]
    pub entry_ttl_secs: u64,
}

impl CacheConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get entry TTL as Duration
    pub fn entry_ttl(&self) -> Duration {
        Duration::from_secs(self.entry_ttl_secs)
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_redis_url(&self.url, "cache")?;
        if self.timeout_secs == 0 {
            return Err(ValidationError::MustBePositive("cache.timeout_secs"));
        }
        if self.entry_ttl_secs == 0 {
            return Err(ValidationError::MustBePositive("cache.entry_ttl_secs"));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout(),
            entry_ttl_secs: default_entry_ttl(),
        }
    }
}

/// Shared by every section that points at Redis.
pub(super) fn validate_redis_url(url: &str, section: &'static str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Err(ValidationError::MissingRequired(section));
    }
    if !url.starts_with("redis://") && !url.starts_with("rediss://") {
        return Err(ValidationError::InvalidRedisUrl(section));
    }
    Ok(())
}

fn default_timeout() -> u64 {
    5
}

fn default_entry_ttl() -> u64 {
    3600
}
