//! Pairing sub-document and the decision taken on each snapshot.

use serde::{Deserialize, Serialize};

use super::PairingStatus;
use crate::domain::foundation::{TimeoutPolicy, Timestamp};

/// The `rfidPairing` sub-document of a user document.
///
/// `pairing_timestamp` is set exactly when `status` is `Waiting`. The RFID
/// reader writes the scanned identifier into `pending_tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingState {
    #[serde(rename = "state")]
    pub status: PairingStatus,
    pub pairing_timestamp: Option<Timestamp>,
    #[serde(default)]
    pub pending_tag: String,
}

/// What the pairing controller must do with a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingDecision {
    /// A tag arrived: persist it and reset.
    Complete { tag: String },
    /// Waiting for longer than the policy allows: reset and notify.
    Expire,
    /// Nothing to do.
    Unchanged,
}

impl PairingState {
    pub fn idle() -> Self {
        Self {
            status: PairingStatus::Idle,
            pairing_timestamp: None,
            pending_tag: String::new(),
        }
    }

    pub fn waiting(now: Timestamp) -> Self {
        Self {
            status: PairingStatus::Waiting,
            pairing_timestamp: Some(now),
            pending_tag: String::new(),
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.status == PairingStatus::Waiting
    }

    /// The scanned tag, if the reader has written a non-blank one.
    pub fn scanned_tag(&self) -> Option<&str> {
        let tag = self.pending_tag.trim();
        if tag.is_empty() {
            None
        } else {
            Some(tag)
        }
    }

    /// Decides the reaction to this snapshot.
    ///
    /// A scanned tag wins over expiry: a pairing that succeeded in the same
    /// snapshot that also looks stale must complete, not time out.
    pub fn evaluate(&self, policy: &TimeoutPolicy, now: &Timestamp) -> PairingDecision {
        if let Some(tag) = self.scanned_tag() {
            return PairingDecision::Complete {
                tag: tag.to_string(),
            };
        }
        if self.is_waiting() && policy.is_expired(self.pairing_timestamp.as_ref(), now) {
            return PairingDecision::Expire;
        }
        PairingDecision::Unchanged
    }
}

impl Default for PairingState {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> Timestamp {
        Timestamp::from_unix_millis(1_700_000_000_000)
    }

    #[test]
    fn idle_has_no_timestamp_or_tag() {
        let state = PairingState::idle();
        assert_eq!(state.status, PairingStatus::Idle);
        assert!(state.pairing_timestamp.is_none());
        assert!(state.pending_tag.is_empty());
    }

    #[test]
    fn waiting_records_start_instant() {
        let state = PairingState::waiting(t0());
        assert!(state.is_waiting());
        assert_eq!(state.pairing_timestamp, Some(t0()));
    }

    #[test]
    fn fresh_waiting_is_unchanged() {
        let state = PairingState::waiting(t0());
        let decision = state.evaluate(&TimeoutPolicy::pairing(), &t0().plus_millis(59_000));
        assert_eq!(decision, PairingDecision::Unchanged);
    }

    #[test]
    fn stale_waiting_expires() {
        let state = PairingState::waiting(t0());
        let decision = state.evaluate(&TimeoutPolicy::pairing(), &t0().plus_millis(61_000));
        assert_eq!(decision, PairingDecision::Expire);
    }

    #[test]
    fn tag_wins_over_expiry() {
        let mut state = PairingState::waiting(t0());
        state.pending_tag = "04:A3:2F:19".to_string();

        let decision = state.evaluate(&TimeoutPolicy::pairing(), &t0().plus_millis(600_000));

        assert_eq!(
            decision,
            PairingDecision::Complete {
                tag: "04:A3:2F:19".to_string()
            }
        );
    }

    #[test]
    fn blank_tag_is_ignored() {
        let mut state = PairingState::waiting(t0());
        state.pending_tag = "   ".to_string();
        assert_eq!(
            state.evaluate(&TimeoutPolicy::pairing(), &t0()),
            PairingDecision::Unchanged
        );
    }

    #[test]
    fn idle_never_expires() {
        let state = PairingState::idle();
        assert_eq!(
            state.evaluate(&TimeoutPolicy::pairing(), &t0().plus_millis(1_000_000)),
            PairingDecision::Unchanged
        );
    }

    #[test]
    fn serializes_with_document_field_names() {
        let json = serde_json::to_value(PairingState::waiting(t0())).unwrap();
        assert_eq!(json["state"], "waiting");
        assert!(json["pairingTimestamp"].is_string());
        assert_eq!(json["pendingTag"], "");
    }
}
