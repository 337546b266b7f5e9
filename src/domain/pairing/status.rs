//! PairingStatus enum for the RFID pairing lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle status of an RFID pairing attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PairingStatus {
    #[default]
    Idle,
    Waiting,
    Error,
}

impl PairingStatus {
    /// Line shown next to the pairing button.
    pub fn status_message(&self) -> &'static str {
        match self {
            PairingStatus::Idle => "Ready to pair",
            PairingStatus::Waiting => "Waiting for RFID card...",
            PairingStatus::Error => "Pairing failed. Please try again.",
        }
    }
}

impl StateMachine for PairingStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PairingStatus::*;
        matches!(
            (self, target),
            (Idle, Waiting)
                | (Waiting, Waiting)
                | (Waiting, Idle)
                | (Waiting, Error)
                | (Error, Idle)
                | (Error, Waiting)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PairingStatus::*;
        match self {
            Idle => vec![Waiting],
            Waiting => vec![Waiting, Idle, Error],
            Error => vec![Idle, Waiting],
        }
    }
}

impl fmt::Display for PairingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PairingStatus::Idle => "Idle",
            PairingStatus::Waiting => "Waiting",
            PairingStatus::Error => "Error",
        };
        write!(f, "{}", s)
    }
}
