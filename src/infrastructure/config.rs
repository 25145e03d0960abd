//! Application configuration.
//!
//! Values come from the process environment, with a `.env` file loaded
//! first when present. Every variable is optional; without `DATABASE_URL`
//! the server runs on the in-memory store.
//!
//! ```rust,ignore
//! use valet::infrastructure::AppConfig;
//!
//! let config = AppConfig::from_env()?;
//! println!("Listening on {}", config.socket_address());
//! ```

use std::env;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The name of the environment variable.
        key: String,
        /// Description of why the value is invalid.
        message: String,
    },
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected \"pretty\" or \"json\", got {other:?}")),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Postgres connection URL; `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Maximum size of the Postgres pool.
    pub database_max_connections: u32,
    /// Apply pending migrations at start-up.
    pub run_migrations: bool,
    /// HTTP server host address.
    pub app_host: String,
    /// HTTP server port.
    pub app_port: u16,
    /// Browser origin allowed by CORS; `None` allows any origin.
    pub cors_allowed_origin: Option<String>,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            run_migrations: true,
            app_host: DEFAULT_HOST.to_string(),
            app_port: DEFAULT_PORT,
            cors_allowed_origin: None,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: Postgres connection string (optional)
    /// - `DATABASE_MAX_CONNECTIONS`: pool size (optional, default: 5)
    /// - `RUN_MIGRATIONS`: apply `migrations/` at start (optional, default: true)
    /// - `APP_HOST`: server host (optional, default: "0.0.0.0")
    /// - `APP_PORT` or `PORT`: server port (optional, default: 3000)
    /// - `CORS_ALLOWED_ORIGIN`: allowed browser origin (optional, default: any)
    /// - `LOG_FORMAT`: `pretty` or `json` (optional, default: pretty)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors if file doesn't exist)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary lookup function.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable has an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let app_port = match value("APP_PORT") {
            Some(port) => parse("APP_PORT", &port)?,
            None => value("PORT").map_or(Ok(defaults.app_port), |port| parse("PORT", &port))?,
        };

        Ok(Self {
            database_url: value("DATABASE_URL"),
            database_max_connections: value("DATABASE_MAX_CONNECTIONS")
                .map_or(Ok(defaults.database_max_connections), |raw| {
                    parse("DATABASE_MAX_CONNECTIONS", &raw)
                })?,
            run_migrations: value("RUN_MIGRATIONS").map_or(Ok(defaults.run_migrations), |raw| {
                parse_flag("RUN_MIGRATIONS", &raw)
            })?,
            app_host: value("APP_HOST").unwrap_or(defaults.app_host),
            app_port,
            cors_allowed_origin: value("CORS_ALLOWED_ORIGIN"),
            log_format: value("LOG_FORMAT")
                .map_or(Ok(defaults.log_format), |raw| parse("LOG_FORMAT", &raw))?,
        })
    }

    /// Returns `host:port` for binding the listener.
    #[must_use]
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.app_host, self.app_port)
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|error: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: error.to_string(),
        })
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got {other:?}"),
        }),
    }
}
