//! Weighing session sub-document and the decision taken on each snapshot.

use serde::{Deserialize, Serialize};

use super::{
    ChildResponse, EatingPattern, MeasurementResult, NutritionStatus, ValidSelection,
    WeighingStatus,
};
use crate::domain::foundation::{StateMachine, TimeoutPolicy, Timestamp, ValidationError};

/// The `weighingSession` sub-document of a user document.
///
/// `result_data` is present exactly when `status` is `Completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeighingSession {
    #[serde(rename = "state")]
    pub status: WeighingStatus,
    pub timestamp: Option<Timestamp>,
    pub eating_pattern: Option<EatingPattern>,
    pub child_response: Option<ChildResponse>,
    #[serde(default)]
    pub tag_id: String,
    pub result_data: Option<MeasurementResult>,
}

/// What the weighing controller must do with a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum WeighingDecision {
    /// The scale finished: show the result, then acknowledge with a reset.
    ShowResult(MeasurementResult),
    /// Waiting for longer than the policy allows: reset and notify.
    Expire,
    /// Nothing to do.
    Unchanged,
}

impl WeighingSession {
    pub fn idle() -> Self {
        Self {
            status: WeighingStatus::Idle,
            timestamp: None,
            eating_pattern: None,
            child_response: None,
            tag_id: String::new(),
            result_data: None,
        }
    }

    pub fn waiting(selection: ValidSelection, now: Timestamp) -> Self {
        Self {
            status: WeighingStatus::Waiting,
            timestamp: Some(now),
            eating_pattern: Some(selection.eating_pattern),
            child_response: Some(selection.child_response),
            tag_id: String::new(),
            result_data: None,
        }
    }

    /// Decides the reaction to this snapshot.
    pub fn evaluate(&self, policy: &TimeoutPolicy, now: &Timestamp) -> WeighingDecision {
        match (&self.status, &self.result_data) {
            (WeighingStatus::Completed, Some(result)) => WeighingDecision::ShowResult(result.clone()),
            (WeighingStatus::Waiting, _) if policy.is_expired(self.timestamp.as_ref(), now) => {
                WeighingDecision::Expire
            }
            _ => WeighingDecision::Unchanged,
        }
    }

    /// Scale side: a card was tapped and measuring has begun.
    pub fn start_measuring(&self, tag_id: impl Into<String>, now: Timestamp) -> Result<Self, ValidationError> {
        let status = self.status.transition_to(WeighingStatus::Measuring)?;
        Ok(Self {
            status,
            timestamp: Some(now),
            tag_id: tag_id.into(),
            ..self.clone()
        })
    }

    /// Scale side: measuring finished with the given readings.
    ///
    /// The result carries the selections recorded when the session started.
    pub fn complete(
        &self,
        weight: f64,
        height: f64,
        nutrition_status: NutritionStatus,
        now: Timestamp,
    ) -> Result<(Self, MeasurementResult), ValidationError> {
        let status = self.status.transition_to(WeighingStatus::Completed)?;
        let result = MeasurementResult {
            weight,
            height,
            nutrition_status,
            eating_pattern: self.eating_pattern,
            child_response: self.child_response,
            date_time: now,
        };
        let session = Self {
            status,
            timestamp: Some(now),
            result_data: Some(result.clone()),
            ..self.clone()
        };
        Ok((session, result))
    }
}

impl Default for WeighingSession {
    fn default() -> Self {
        Self::idle()
    }
}
