//! Service configuration

use crate::rate_limit::RateLimitConfig;
use data_validator::ValidationConfig;
use serde::{Deserialize, Serialize};
use storage::StorageConfig;

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend
    #[serde(default)]
    pub storage: StorageConfig,

    /// Rate limiting for write endpoints
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Input validation
    #[serde(default)]
    pub validation: ValidationSettings,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Install the Prometheus exporter and serve `/metrics`
    #[serde(default = "default_true")]
    pub enable_metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            enable_cors: true,
            enable_metrics: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Input validation limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Highest accepted speed (km/h)
    #[serde(default = "default_max_speed")]
    pub max_speed_kmh: i64,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            max_speed_kmh: default_max_speed(),
        }
    }
}

impl From<&ValidationSettings> for ValidationConfig {
    fn from(settings: &ValidationSettings) -> Self {
        ValidationConfig {
            speed_range: (0, settings.max_speed_kmh),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_speed() -> i64 {
    300
}

impl ServiceConfig {
    /// Load configuration: defaults, then an optional file, then `TRAFFIC__*`
    /// environment variables (e.g. `TRAFFIC__SERVER__LISTEN_ADDR`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&ServiceConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("TRAFFIC")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.listen_addr, "0.0.0.0:8080");
        assert!(config.server.enable_cors);
        assert_eq!(config.storage, StorageConfig::Memory);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.validation.max_speed_kmh, 300);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = ServiceConfig::load(Some("does-not-exist")).unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.rate_limit.burst_size, 5);
        assert_eq!(config.storage, StorageConfig::Memory);
    }

    #[test]
    fn test_sqlite_storage_section() {
        let config: ServiceConfig = serde_json::from_str(
            r#"{"storage":{"type":"sqlite","url":"sqlite://traffic_system.db"}}"#,
        )
        .unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Sqlite {
                url: "sqlite://traffic_system.db".to_string(),
                max_connections: 5,
            }
        );
    }

    #[test]
    fn test_validation_settings_conversion() {
        let settings = ValidationSettings { max_speed_kmh: 180 };
        let config = ValidationConfig::from(&settings);
        assert_eq!(config.speed_range, (0, 180));
    }
}
