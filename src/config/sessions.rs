//! Pairing and weighing session configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::foundation::{TimeoutPolicy, PAIRING_TIMEOUT_MS, WEIGHING_TIMEOUT_MS};

/// How long each device session may wait for the device
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// Pairing expiry in milliseconds
    #[serde(default = "default_pairing_timeout")]
    pub pairing_timeout_ms: u64,

    /// Weighing expiry in milliseconds
    #[serde(default = "default_weighing_timeout")]
    pub weighing_timeout_ms: u64,
}

impl SessionConfig {
    pub fn pairing_policy(&self) -> TimeoutPolicy {
        TimeoutPolicy::from_millis(self.pairing_timeout_ms)
    }

    pub fn weighing_policy(&self) -> TimeoutPolicy {
        TimeoutPolicy::from_millis(self.weighing_timeout_ms)
    }

    /// Validate session configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pairing_timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout("pairing_timeout_ms"));
        }
        if self.weighing_timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout("weighing_timeout_ms"));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pairing_timeout_ms: default_pairing_timeout(),
            weighing_timeout_ms: default_weighing_timeout(),
        }
    }
}

fn default_pairing_timeout() -> u64 {
    PAIRING_TIMEOUT_MS
}

fn default_weighing_timeout() -> u64 {
    WEIGHING_TIMEOUT_MS
}
