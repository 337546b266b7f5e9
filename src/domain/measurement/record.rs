//! Entries of a user's measurement history.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MeasurementId, Timestamp, ValidationError};
use crate::domain::weighing::{ChildResponse, EatingPattern, MeasurementResult, NutritionStatus};

fn positive(field: &str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::not_positive(field, value))
    }
}

/// One stored measurement in the user's history collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRecord {
    pub id: MeasurementId,
    pub weight: f64,
    pub height: f64,
    pub nutrition_status: NutritionStatus,
    pub eating_pattern: Option<EatingPattern>,
    pub child_response: Option<ChildResponse>,
    pub date_time: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MeasurementRecord {
    /// History copy of a result written by the scale.
    pub fn from_result(result: &MeasurementResult, now: Timestamp) -> Self {
        Self {
            id: MeasurementId::new(),
            weight: result.weight,
            height: result.height,
            nutrition_status: result.nutrition_status,
            eating_pattern: result.eating_pattern,
            child_response: result.child_response,
            date_time: result.date_time,
            created_at: now,
            updated_at: now,
        }
    }

    /// History entry typed in by hand.
    pub fn from_entry(entry: &MeasurementEntry, now: Timestamp) -> Self {
        Self {
            id: MeasurementId::new(),
            weight: entry.weight,
            height: entry.height,
            nutrition_status: entry.nutrition_status,
            eating_pattern: None,
            child_response: None,
            date_time: entry.date_time,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies an edit. Only fields present in `update` change.
    pub fn apply(&mut self, update: &MeasurementUpdate, now: Timestamp) {
        if let Some(weight) = update.weight {
            self.weight = weight;
        }
        if let Some(height) = update.height {
            self.height = height;
        }
        if let Some(status) = update.nutrition_status {
            self.nutrition_status = status;
        }
        if let Some(date_time) = update.date_time {
            self.date_time = date_time;
        }
        self.updated_at = now;
    }
}

/// A manually entered measurement. Weight and height must be positive.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementEntry {
    pub weight: f64,
    pub height: f64,
    pub nutrition_status: NutritionStatus,
    pub date_time: Timestamp,
}

impl MeasurementEntry {
    pub fn new(
        weight: f64,
        height: f64,
        nutrition_status: NutritionStatus,
        date_time: Timestamp,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            weight: positive("weight", weight)?,
            height: positive("height", height)?,
            nutrition_status,
            date_time,
        })
    }
}

/// Edit of an existing history entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementUpdate {
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub nutrition_status: Option<NutritionStatus>,
    pub date_time: Option<Timestamp>,
}

impl MeasurementUpdate {
    pub fn is_empty(&self) -> bool {
        self.weight.is_none()
            && self.height.is_none()
            && self.nutrition_status.is_none()
            && self.date_time.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(weight) = self.weight {
            positive("weight", weight)?;
        }
        if let Some(height) = self.height {
            positive("height", height)?;
        }
        Ok(())
    }
}
