//! Renewal scheduler configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Timing of the renewal scan loops
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between scans of one horizon
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl SchedulerConfig {
    /// Get poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Validate scheduler configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.poll_interval_secs == 0 {
            return Err(ValidationError::MustBePositive("scheduler.poll_interval_secs"));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

fn default_poll_interval() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_config_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(3600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_interval() {
        let config = SchedulerConfig {
            poll_interval_secs: 0,
        };
        assert!(config.validate().is_err());
    }
}
