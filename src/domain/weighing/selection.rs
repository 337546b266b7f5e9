//! Observations the parent records before a weigh-in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// How much the child has been eating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EatingPattern {
    Kurang,
    Cukup,
    Berlebih,
}

impl EatingPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            EatingPattern::Kurang => "kurang",
            EatingPattern::Cukup => "cukup",
            EatingPattern::Berlebih => "berlebih",
        }
    }
}

impl fmt::Display for EatingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EatingPattern {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kurang" => Ok(EatingPattern::Kurang),
            "cukup" => Ok(EatingPattern::Cukup),
            "berlebih" => Ok(EatingPattern::Berlebih),
            other => Err(ValidationError::invalid_format(
                "eating_pattern",
                format!("unknown value '{}'", other),
            )),
        }
    }
}

/// How the child responded during the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildResponse {
    Pasif,
    Sedang,
    Aktif,
}

impl ChildResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChildResponse::Pasif => "pasif",
            ChildResponse::Sedang => "sedang",
            ChildResponse::Aktif => "aktif",
        }
    }
}

impl fmt::Display for ChildResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChildResponse {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pasif" => Ok(ChildResponse::Pasif),
            "sedang" => Ok(ChildResponse::Sedang),
            "aktif" => Ok(ChildResponse::Aktif),
            other => Err(ValidationError::invalid_format(
                "child_response",
                format!("unknown value '{}'", other),
            )),
        }
    }
}

/// Raw form input; either field may still be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub eating_pattern: Option<EatingPattern>,
    pub child_response: Option<ChildResponse>,
}

/// A selection with both fields present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidSelection {
    pub eating_pattern: EatingPattern,
    pub child_response: ChildResponse,
}

impl Selection {
    pub fn new(eating_pattern: EatingPattern, child_response: ChildResponse) -> Self {
        Self {
            eating_pattern: Some(eating_pattern),
            child_response: Some(child_response),
        }
    }

    /// Checks both fields are present.
    pub fn validate(&self) -> Result<ValidSelection, ValidationError> {
        let eating_pattern = self
            .eating_pattern
            .ok_or_else(|| ValidationError::empty_field("eating_pattern"))?;
        let child_response = self
            .child_response
            .ok_or_else(|| ValidationError::empty_field("child_response"))?;
        Ok(ValidSelection {
            eating_pattern,
            child_response,
        })
    }
}
