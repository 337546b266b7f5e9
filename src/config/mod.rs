//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `TIMBANG` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use timbang::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Pairing expires after {} ms", config.sessions.pairing_timeout_ms);
//! ```

mod backend;
mod error;
mod logging;
mod sessions;

pub use backend::{BackendConfig, Environment};
pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use sessions::SessionConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Document store / identity backend
    pub backend: BackendConfig,

    /// Pairing and weighing timeouts
    #[serde(default)]
    pub sessions: SessionConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TIMBANG` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TIMBANG__BACKEND__PROJECT_ID=...` -> `backend.project_id = ...`
    /// - `TIMBANG__SESSIONS__PAIRING_TIMEOUT_MS=60000` -> `sessions.pairing_timeout_ms = 60000`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TIMBANG")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.backend.validate()?;
        self.sessions.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.backend.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("TIMBANG__BACKEND__PROJECT_ID", "timbang-test");
        env::set_var("TIMBANG__BACKEND__API_KEY", "test-api-key");
    }

    fn clear_env() {
        env::remove_var("TIMBANG__BACKEND__PROJECT_ID");
        env::remove_var("TIMBANG__BACKEND__API_KEY");
        env::remove_var("TIMBANG__BACKEND__ADMIN_EMAIL");
        env::remove_var("TIMBANG__BACKEND__ENVIRONMENT");
        env::remove_var("TIMBANG__SESSIONS__PAIRING_TIMEOUT_MS");
        env::remove_var("TIMBANG__LOGGING__FORMAT");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.backend.project_id, "timbang-test");
        assert_eq!(config.backend.api_key.expose_secret(), "test-api-key");
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.backend.admin_email, "admin@gmail.com");
        assert_eq!(config.backend.environment, Environment::Development);
        assert_eq!(config.sessions, SessionConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("TIMBANG__BACKEND__ENVIRONMENT", "production");
        env::set_var("TIMBANG__SESSIONS__PAIRING_TIMEOUT_MS", "90000");
        env::set_var("TIMBANG__LOGGING__FORMAT", "json");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(config.sessions.pairing_timeout_ms, 90_000);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_missing_backend_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
