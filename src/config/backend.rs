//! Document store / identity backend configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// Connection settings for the hosted document store and identity service
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Project the user documents live in
    pub project_id: String,

    /// Client API key
    pub api_key: Secret<String>,

    /// The one email address that is always an administrator
    #[serde(default = "default_admin_email")]
    pub admin_email: String,

    /// Environment name
    #[serde(default)]
    pub environment: Environment,
}

/// Application environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl BackendConfig {
    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Validate backend configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.project_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("BACKEND__PROJECT_ID"));
        }
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("BACKEND__API_KEY"));
        }
        let email = self.admin_email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(ValidationError::InvalidAdminEmail),
        }
    }
}

fn default_admin_email() -> String {
    "admin@gmail.com".to_string()
}
