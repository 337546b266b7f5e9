//! Timeout policy for device-driven workflows.
//!
//! A workflow that is waiting on an external device records the instant it
//! started waiting. The policy decides, each time a snapshot is evaluated,
//! whether that instant has aged past a fixed threshold.

use std::time::Duration;

use super::Timestamp;

/// How long a pairing may wait for an RFID tap.
pub const PAIRING_TIMEOUT_MS: u64 = 60_000;

/// How long a weighing session may wait for the scale.
pub const WEIGHING_TIMEOUT_MS: u64 = 300_000;

/// Returns true iff `timestamp` is present and strictly more than
/// `threshold_ms` milliseconds before `now`.
///
/// An absent timestamp means the workflow never started and is never
/// expired. Exactly `threshold_ms` of age is still within the window.
pub fn is_expired(timestamp: Option<&Timestamp>, threshold_ms: u64, now: &Timestamp) -> bool {
    match timestamp {
        None => false,
        Some(started) => {
            let elapsed = now.millis_since(started);
            elapsed > 0 && elapsed as u64 > threshold_ms
        }
    }
}

/// A timeout threshold bound to one workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    threshold_ms: u64,
}

impl TimeoutPolicy {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold_ms: threshold.as_millis().min(u64::MAX as u128) as u64,
        }
    }

    pub fn from_millis(threshold_ms: u64) -> Self {
        Self { threshold_ms }
    }

    /// 60 second RFID pairing window.
    pub fn pairing() -> Self {
        Self::from_millis(PAIRING_TIMEOUT_MS)
    }

    /// 5 minute weighing window.
    pub fn weighing() -> Self {
        Self::from_millis(WEIGHING_TIMEOUT_MS)
    }

    pub fn threshold_ms(&self) -> u64 {
        self.threshold_ms
    }

    pub fn is_expired(&self, timestamp: Option<&Timestamp>, now: &Timestamp) -> bool {
        is_expired(timestamp, self.threshold_ms, now)
    }
}
