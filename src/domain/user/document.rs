//! The per-user document held by the document store.

use serde::{Deserialize, Serialize};

use super::UserProfile;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::pairing::PairingState;
use crate::domain::weighing::{MeasurementResult, WeighingSession};

/// Everything the store keeps for one user.
///
/// Owned by that user; the only other writer is the IoT device, which
/// touches `rfid_pairing.pending_tag`, `weighing_session` and
/// `latest_weighing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub id: UserId,
    #[serde(flatten)]
    pub profile: UserProfile,
    /// Permanently paired RFID tag.
    pub rfid: Option<String>,
    #[serde(default)]
    pub rfid_pairing: PairingState,
    #[serde(default)]
    pub weighing_session: WeighingSession,
    pub latest_weighing: Option<MeasurementResult>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserDocument {
    /// A fresh document with idle pairing and weighing sub-documents.
    pub fn new(id: UserId, profile: UserProfile, now: Timestamp) -> Self {
        Self {
            id,
            profile,
            rfid: None,
            rfid_pairing: PairingState::idle(),
            weighing_session: WeighingSession::idle(),
            latest_weighing: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.profile.is_admin()
    }

    pub fn has_rfid(&self) -> bool {
        self.rfid.as_deref().map(|tag| !tag.is_empty()).unwrap_or(false)
    }
}
