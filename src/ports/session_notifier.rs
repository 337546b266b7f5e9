//! SessionNotifier port - user-visible notices raised by the controllers.

use crate::domain::foundation::UserId;
use crate::domain::weighing::MeasurementResult;

/// Something the user should be told about.
///
/// Timeouts are notices, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotice {
    PairingCompleted { user_id: UserId, tag: String },
    PairingTimedOut { user_id: UserId },
    WeighingResult { user_id: UserId, result: MeasurementResult },
    WeighingTimedOut { user_id: UserId },
}

impl SessionNotice {
    pub fn user_id(&self) -> &UserId {
        match self {
            SessionNotice::PairingCompleted { user_id, .. }
            | SessionNotice::PairingTimedOut { user_id }
            | SessionNotice::WeighingResult { user_id, .. }
            | SessionNotice::WeighingTimedOut { user_id } => user_id,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SessionNotice::PairingCompleted { .. } => "RFID Paired",
            SessionNotice::PairingTimedOut { .. } => "Pairing Timeout",
            SessionNotice::WeighingResult { .. } => "Measurement Result",
            SessionNotice::WeighingTimedOut { .. } => "Weighing Timeout",
        }
    }

    pub fn message(&self) -> String {
        match self {
            SessionNotice::PairingCompleted { tag, .. } => {
                format!("RFID card {} is now linked to your profile.", tag)
            }
            SessionNotice::PairingTimedOut { .. } => {
                "No RFID card was detected. Please try pairing again.".to_string()
            }
            SessionNotice::WeighingResult { result, .. } => format!(
                "Weight {:.1} kg, height {:.1} cm, status {}.",
                result.weight, result.height, result.nutrition_status
            ),
            SessionNotice::WeighingTimedOut { .. } => {
                "The scale did not respond. Please start the weighing again.".to_string()
            }
        }
    }
}

/// Delivers notices to whatever presents them.
pub trait SessionNotifier: Send + Sync {
    fn notify(&self, notice: SessionNotice);
}
