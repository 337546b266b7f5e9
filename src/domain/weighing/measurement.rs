//! Measurement result produced by the scale.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ChildResponse, EatingPattern};
use crate::domain::foundation::{Timestamp, ValidationError};

/// Nutrition category assigned upstream by the scale service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NutritionStatus {
    #[serde(rename = "sehat")]
    Sehat,
    #[serde(rename = "tidak sehat")]
    TidakSehat,
    #[serde(rename = "obesitas")]
    Obesitas,
}

impl NutritionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NutritionStatus::Sehat => "sehat",
            NutritionStatus::TidakSehat => "tidak sehat",
            NutritionStatus::Obesitas => "obesitas",
        }
    }

    /// True for every category other than healthy.
    pub fn needs_attention(&self) -> bool {
        !matches!(self, NutritionStatus::Sehat)
    }
}

impl fmt::Display for NutritionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NutritionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sehat" => Ok(NutritionStatus::Sehat),
            "tidak sehat" => Ok(NutritionStatus::TidakSehat),
            "obesitas" => Ok(NutritionStatus::Obesitas),
            other => Err(ValidationError::invalid_format(
                "nutrition_status",
                format!("unknown value '{}'", other),
            )),
        }
    }
}

/// Outcome of one weigh-in. Immutable once recorded.
///
/// Weight is in kilograms and height in centimetres. Values come straight
/// from the scale and are not range-checked here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementResult {
    pub weight: f64,
    pub height: f64,
    pub nutrition_status: NutritionStatus,
    pub eating_pattern: Option<EatingPattern>,
    pub child_response: Option<ChildResponse>,
    pub date_time: Timestamp,
}
