//! WeighingStatus enum for the weigh-in lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle status of a weighing session.
///
/// The app moves `Idle -> Waiting` and back to `Idle`; the scale moves
/// `Waiting -> Measuring -> Completed` (or `Error`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeighingStatus {
    #[default]
    Idle,
    Waiting,
    Measuring,
    Completed,
    Error,
}

impl WeighingStatus {
    /// Line shown in the status badge.
    pub fn status_message(&self) -> &'static str {
        match self {
            WeighingStatus::Idle => "Ready to start weighing",
            WeighingStatus::Waiting => "Waiting for RFID card tap...",
            WeighingStatus::Measuring => "Measuring in progress...",
            WeighingStatus::Completed => "Measurement completed!",
            WeighingStatus::Error => "Error occurred during measurement",
        }
    }

    /// True while the scale is expected to act.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, WeighingStatus::Waiting | WeighingStatus::Measuring)
    }
}

impl StateMachine for WeighingStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use WeighingStatus::*;
        matches!(
            (self, target),
            (Idle, Waiting)
                | (Waiting, Waiting)
                | (Waiting, Measuring)
                | (Waiting, Completed)
                | (Waiting, Error)
                | (Waiting, Idle)
                | (Measuring, Completed)
                | (Measuring, Error)
                | (Measuring, Idle)
                | (Completed, Idle)
                | (Error, Idle)
                | (Error, Waiting)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use WeighingStatus::*;
        match self {
            Idle => vec![Waiting],
            Waiting => vec![Waiting, Measuring, Completed, Error, Idle],
            Measuring => vec![Completed, Error, Idle],
            Completed => vec![Idle],
            Error => vec![Idle, Waiting],
        }
    }
}

impl fmt::Display for WeighingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WeighingStatus::Idle => "Idle",
            WeighingStatus::Waiting => "Waiting",
            WeighingStatus::Measuring => "Measuring",
            WeighingStatus::Completed => "Completed",
            WeighingStatus::Error => "Error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_path_is_valid() {
        let status = WeighingStatus::Idle
            .transition_to(WeighingStatus::Waiting)
            .and_then(|s| s.transition_to(WeighingStatus::Measuring))
            .and_then(|s| s.transition_to(WeighingStatus::Completed))
            .and_then(|s| s.transition_to(WeighingStatus::Idle));
        assert_eq!(status, Ok(WeighingStatus::Idle));
    }

    #[test]
    fn idle_cannot_jump_to_completed() {
        assert!(WeighingStatus::Idle
            .transition_to(WeighingStatus::Completed)
            .is_err());
    }

    #[test]
    fn completed_only_returns_to_idle() {
        assert_eq!(
            WeighingStatus::Completed.valid_transitions(),
            vec![WeighingStatus::Idle]
        );
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        use WeighingStatus::*;
        for status in [Idle, Waiting, Measuring, Completed, Error] {
            for target in status.valid_transitions() {
                assert!(status.can_transition_to(&target), "{:?} -> {:?}", status, target);
            }
        }
    }

    #[test]
    fn in_progress_states() {
        assert!(WeighingStatus::Waiting.is_in_progress());
        assert!(WeighingStatus::Measuring.is_in_progress());
        assert!(!WeighingStatus::Completed.is_in_progress());
    }

    #[test]
    fn serializes_to_snake_case_json() {
        assert_eq!(
            serde_json::to_string(&WeighingStatus::Measuring).unwrap(),
            "\"measuring\""
        );
    }
}
