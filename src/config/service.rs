//! Service-wide settings: environment and logging

use serde::Deserialize;

use super::error::ValidationError;

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Environment name
    #[serde(default = "default_environment")]
    pub environment: Environment,

    /// Log filter directive, used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `pretty` or `json`; production always logs JSON
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

/// Application environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServiceConfig {
    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Whether log lines are emitted as JSON
    pub fn json_logs(&self) -> bool {
        self.is_production() || self.log_format.eq_ignore_ascii_case("json")
    }

    /// Validate service configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.log_level.trim().is_empty() {
            return Err(ValidationError::MissingRequired("SERVICE_LOG_LEVEL"));
        }
        match self.log_format.to_ascii_lowercase().as_str() {
            "pretty" | "json" => Ok(()),
            _ => Err(ValidationError::InvalidLogFormat(self.log_format.clone())),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_log_level() -> String {
    "info,subscription_tracker=debug,sqlx=warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_config_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.log_format, "pretty");
        assert!(!config.json_logs());
    }

    #[test]
    fn test_production_forces_json_logs() {
        let config = ServiceConfig {
            environment: Environment::Production,
            ..Default::default()
        };
        assert!(config.is_production());
        assert!(config.json_logs());
    }

    #[test]
    fn test_json_format_requested() {
        let config = ServiceConfig {
            log_format: "JSON".to_string(),
            ..Default::default()
        };
        assert!(config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_unknown_log_format() {
        let config = ServiceConfig {
            log_format: "xml".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidLogFormat("xml".to_string()))
        );
    }
}
