//! Notification queue configuration

use serde::Deserialize;
use std::time::Duration;

use super::cache::validate_redis_url;
use super::error::ValidationError;

/// Broker connection and queue names for renewal notifications
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Redis connection URL of the broker
    pub url: String,

    /// Connection attempts before startup fails
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Pause between connection attempts in seconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Queue for subscriptions due today
    #[serde(default = "default_due_today_queue")]
    pub due_today_queue: String,

    /// Queue for subscriptions due tomorrow
    #[serde(default = "default_due_tomorrow_queue")]
    pub due_tomorrow_queue: String,
}

impl QueueConfig {
    /// Get retry delay as Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Validate queue configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_redis_url(&self.url, "queue")?;
        if self.max_retries == 0 {
            return Err(ValidationError::MustBePositive("queue.max_retries"));
        }
        if self.due_today_queue.trim().is_empty() {
            return Err(ValidationError::MissingRequired("queue.due_today_queue"));
        }
        if self.due_tomorrow_queue.trim().is_empty() {
            return Err(ValidationError::MissingRequired("queue.due_tomorrow_queue"));
        }
        if self.due_today_queue == self.due_tomorrow_queue {
            return Err(ValidationError::DuplicateQueueName(self.due_today_queue.clone()));
        }
        Ok(())
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay(),
            due_today_queue: default_due_today_queue(),
            due_tomorrow_queue: default_due_tomorrow_queue(),
        }
    }
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    5
}

fn default_due_today_queue() -> String {
    "renewals.due_today".to_string()
}

fn default_due_tomorrow_queue() -> String {
    "renewals.due_tomorrow".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> QueueConfig {
        QueueConfig {
            url: "redis://localhost:6379/1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_queue_config_defaults() {
        let config = QueueConfig::default();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay(), Duration::from_secs(5));
        assert_eq!(config.due_today_queue, "renewals.due_today");
        assert_eq!(config.due_tomorrow_queue, "renewals.due_tomorrow");
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validation_duplicate_queue_names() {
        let config = QueueConfig {
            due_tomorrow_queue: "renewals.due_today".to_string(),
            ..valid()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::DuplicateQueueName("renewals.due_today".to_string()))
        );
    }

    #[test]
    fn test_validation_zero_retries() {
        let config = QueueConfig {
            max_retries: 0,
            ..valid()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MustBePositive("queue.max_retries"))
        );
    }

    #[test]
    fn test_validation_blank_queue_name() {
        let config = QueueConfig {
            due_today_queue: "  ".to_string(),
            ..valid()
        };
        assert!(config.validate().is_err());
    }
}
