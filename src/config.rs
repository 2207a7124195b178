//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

/// How the core banking gateway is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreGatewayMode {
    /// In-process simulator, no network calls
    Simulated,
    /// Real HTTP client against `core_api_url`
    Http,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Core banking gateway selection
    pub core_gateway_mode: CoreGatewayMode,

    /// Base URL of the core banking API (http mode)
    pub core_api_url: String,

    /// API key sent to the core banking API, if any
    pub core_api_key: Option<String>,

    /// Per-request timeout for core banking calls
    pub core_timeout: Duration,

    /// Attempts per core banking step during submission
    pub core_retry_max_attempts: u32,

    /// Base delay of the linear backoff between attempts
    pub core_backoff_base: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let core_gateway_mode = match env::var("CORE_GATEWAY_MODE")
            .unwrap_or_else(|_| "simulated".to_string())
            .as_str()
        {
            "simulated" => CoreGatewayMode::Simulated,
            "http" => CoreGatewayMode::Http,
            _ => return Err(ConfigError::InvalidValue("CORE_GATEWAY_MODE")),
        };

        let core_api_url = env::var("CORE_API_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}/mock/core/v1"));

        let core_api_key = env::var("CORE_API_KEY").ok();

        let core_timeout_ms: u64 = env::var("CORE_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("CORE_TIMEOUT_MS"))?;

        let core_retry_max_attempts = env::var("CORE_RETRY_MAX_ATTEMPTS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("CORE_RETRY_MAX_ATTEMPTS"))?;

        let core_backoff_base_ms: u64 = env::var("CORE_BACKOFF_BASE_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("CORE_BACKOFF_BASE_MS"))?;

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            core_gateway_mode,
            core_api_url,
            core_api_key,
            core_timeout: Duration::from_millis(core_timeout_ms),
            core_retry_max_attempts,
            core_backoff_base: Duration::from_millis(core_backoff_base_ms),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
