//! Application configuration module
//! Handles environment variable loading, configuration validation, and application settings

use std::env;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub gateway: GatewayConfig,
    pub directory: DirectoryConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: u64,   // seconds
    pub idle_timeout: Option<u64>, // seconds
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log format options
#[derive(Debug, Clone)]
pub enum LogFormat {
    Json,
    Plain,
}

/// Card gateway configuration
///
/// The merchant id and shared signing secret are issued by the gateway;
/// the environment flag selects the sandbox or production endpoint.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub merchant_id: String,
    pub secret_key: String,
    pub currency_code: String,
    pub environment: GatewayEnvironment,
    pub base_url_override: Option<String>,
    pub frontend_return_url: Option<String>,
    pub backend_return_url: Option<String>,
    pub request_timeout: u64, // seconds
}

/// Gateway environment selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEnvironment {
    Sandbox,
    Production,
}

impl std::fmt::Display for GatewayEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayEnvironment::Sandbox => write!(f, "sandbox"),
            GatewayEnvironment::Production => write!(f, "production"),
        }
    }
}

/// Membership directory configuration (member + shipment tracking lookups)
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub base_url: String,
    pub request_timeout: u64, // seconds
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenv::dotenv().ok();

        Ok(AppConfig {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
            gateway: GatewayConfig::from_env()?,
            directory: DirectoryConfig::from_env()?,
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.logging.validate()?;
        self.gateway.validate()?;
        self.directory.validate()?;

        Ok(())
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ServerConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue(
                "SERVER_PORT cannot be 0".to_string(),
            ));
        }

        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SERVER_HOST cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(DatabaseConfig {
            url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::MissingVariable("DATABASE_URL".to_string()))?,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MIN_CONNECTIONS".to_string()))?,
            connection_timeout: env::var("DB_CONNECTION_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_CONNECTION_TIMEOUT".to_string()))?,
            idle_timeout: env::var("DB_IDLE_TIMEOUT")
                .ok()
                .and_then(|val| val.parse().ok()),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::InvalidValue("DATABASE_URL".to_string()));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::InvalidValue(
                "DB_MIN_CONNECTIONS must be <= DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(())
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "plain".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Plain,
            },
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
        if !valid_levels.contains(&self.level.to_uppercase().as_str()) {
            return Err(ConfigError::InvalidValue("LOG_LEVEL".to_string()));
        }

        Ok(())
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(GatewayConfig {
            merchant_id: env::var("GATEWAY_MERCHANT_ID")
                .map_err(|_| ConfigError::MissingVariable("GATEWAY_MERCHANT_ID".to_string()))?,
            secret_key: env::var("GATEWAY_SECRET_KEY")
                .map_err(|_| ConfigError::MissingVariable("GATEWAY_SECRET_KEY".to_string()))?,
            currency_code: env::var("GATEWAY_CURRENCY_CODE")
                .unwrap_or_else(|_| "THB".to_string()),
            environment: match env::var("GATEWAY_ENVIRONMENT")
                .unwrap_or_else(|_| "sandbox".to_string())
                .to_lowercase()
                .as_str()
            {
                "production" => GatewayEnvironment::Production,
                "sandbox" => GatewayEnvironment::Sandbox,
                _ => return Err(ConfigError::InvalidValue("GATEWAY_ENVIRONMENT".to_string())),
            },
            base_url_override: env::var("GATEWAY_BASE_URL").ok(),
            frontend_return_url: env::var("GATEWAY_FRONTEND_RETURN_URL").ok(),
            backend_return_url: env::var("GATEWAY_BACKEND_RETURN_URL").ok(),
            request_timeout: env::var("GATEWAY_REQUEST_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("GATEWAY_REQUEST_TIMEOUT".to_string()))?,
        })
    }

    /// Endpoint base selected by the environment flag, unless overridden.
    pub fn base_url(&self) -> &str {
        if let Some(url) = &self.base_url_override {
            return url;
        }
        match self.environment {
            GatewayEnvironment::Production => "https://pgw.2c2p.com",
            GatewayEnvironment::Sandbox => "https://sandbox-pgw.2c2p.com",
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.merchant_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "GATEWAY_MERCHANT_ID cannot be empty".to_string(),
            ));
        }

        if self.secret_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "GATEWAY_SECRET_KEY cannot be empty".to_string(),
            ));
        }

        if self.currency_code.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "GATEWAY_CURRENCY_CODE cannot be empty".to_string(),
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::InvalidValue(
                "GATEWAY_REQUEST_TIMEOUT".to_string(),
            ));
        }

        if let Some(url) = &self.base_url_override {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue(
                    "GATEWAY_BASE_URL must be a valid URL".to_string(),
                ));
            }
        }

        Ok(())
    }
}

impl DirectoryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(DirectoryConfig {
            base_url: env::var("DIRECTORY_BASE_URL")
                .map_err(|_| ConfigError::MissingVariable("DIRECTORY_BASE_URL".to_string()))?,
            request_timeout: env::var("DIRECTORY_REQUEST_TIMEOUT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DIRECTORY_REQUEST_TIMEOUT".to_string()))?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "DIRECTORY_BASE_URL must be a valid URL".to_string(),
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::InvalidValue(
                "DIRECTORY_REQUEST_TIMEOUT".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),

    #[error("Invalid value for configuration: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway_config() -> GatewayConfig {
        GatewayConfig {
            merchant_id: "JT01".to_string(),
            secret_key: "shared-secret".to_string(),
            currency_code: "THB".to_string(),
            environment: GatewayEnvironment::Sandbox,
            base_url_override: None,
            frontend_return_url: None,
            backend_return_url: None,
            request_timeout: 30,
        }
    }

    #[test]
    fn test_server_config_validation() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_port_validation() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Invalid port
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_gateway_environment_selects_base_url() {
        let mut config = gateway_config();
        assert_eq!(config.base_url(), "https://sandbox-pgw.2c2p.com");

        config.environment = GatewayEnvironment::Production;
        assert_eq!(config.base_url(), "https://pgw.2c2p.com");

        config.base_url_override = Some("https://gateway.test.local".to_string());
        assert_eq!(config.base_url(), "https://gateway.test.local");
    }

    #[test]
    fn test_gateway_config_requires_credentials() {
        let mut config = gateway_config();
        assert!(config.validate().is_ok());

        config.merchant_id = "".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_directory_config_requires_url_scheme() {
        let config = DirectoryConfig {
            base_url: "directory.local".to_string(),
            request_timeout: 10,
        };

        assert!(config.validate().is_err());
    }
}
