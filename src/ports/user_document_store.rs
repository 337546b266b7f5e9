//! UserDocumentStore port - per-user document read/write/merge-update.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::pairing::PairingState;
use crate::domain::user::{Age, Gender, UserDocument};
use crate::domain::weighing::{MeasurementResult, WeighingSession};

/// Profile fields changed by a merge update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub age: Option<Age>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.birthdate.is_none() && self.gender.is_none() && self.age.is_none()
    }
}

/// Merge update of a user document.
///
/// Sub-documents are replaced whole; fields left `None` are untouched.
/// The store stamps `updated_at` on every applied update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentUpdate {
    pub profile: Option<ProfilePatch>,
    pub rfid: Option<String>,
    pub rfid_pairing: Option<PairingState>,
    pub weighing_session: Option<WeighingSession>,
    pub latest_weighing: Option<MeasurementResult>,
}

impl DocumentUpdate {
    pub fn pairing(state: PairingState) -> Self {
        Self {
            rfid_pairing: Some(state),
            ..Default::default()
        }
    }

    pub fn weighing(session: WeighingSession) -> Self {
        Self {
            weighing_session: Some(session),
            ..Default::default()
        }
    }

    pub fn profile(patch: ProfilePatch) -> Self {
        Self {
            profile: Some(patch),
            ..Default::default()
        }
    }

    pub fn with_rfid(mut self, tag: impl Into<String>) -> Self {
        self.rfid = Some(tag.into());
        self
    }

    pub fn with_latest_weighing(mut self, result: MeasurementResult) -> Self {
        self.latest_weighing = Some(result);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.profile.as_ref().map(ProfilePatch::is_empty).unwrap_or(true)
            && self.rfid.is_none()
            && self.rfid_pairing.is_none()
            && self.weighing_session.is_none()
            && self.latest_weighing.is_none()
    }

    /// Merges this update into `document`.
    ///
    /// Adapters whose backend has no server-side merge use this to build the
    /// new document before writing it back.
    pub fn apply_to(self, document: &mut UserDocument, now: Timestamp) {
        if let Some(patch) = self.profile {
            if let Some(name) = patch.name {
                document.profile.name = name;
            }
            if let Some(birthdate) = patch.birthdate {
                document.profile.birthdate = Some(birthdate);
            }
            if let Some(gender) = patch.gender {
                document.profile.gender = Some(gender);
            }
            if let Some(age) = patch.age {
                document.profile.age_years = age.years;
                document.profile.age_months = age.months;
            }
        }
        if let Some(rfid) = self.rfid {
            document.rfid = Some(rfid);
        }
        if let Some(state) = self.rfid_pairing {
            document.rfid_pairing = state;
        }
        if let Some(session) = self.weighing_session {
            document.weighing_session = session;
        }
        if let Some(result) = self.latest_weighing {
            document.latest_weighing = Some(result);
        }
        document.updated_at = now;
    }
}

/// Store holding one document per user.
///
/// # Contract
///
/// Implementations must:
/// - Report `ErrorCode::BackendUnavailable` when not initialized
/// - Report `ErrorCode::UserNotFound` when updating a missing document
/// - Report `ErrorCode::WriteRejected` / `ErrorCode::ReadFailed` with the
///   backend's own message when it refuses an operation
/// - Push the committed document to every live subscription of that user
#[async_trait]
pub trait UserDocumentStore: Send + Sync {
    /// Whether the backend has been initialized. Checked before any call.
    fn is_ready(&self) -> bool {
        true
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<UserDocument>, DomainError>;

    /// Creates or overwrites the document.
    async fn create(&self, document: &UserDocument) -> Result<(), DomainError>;

    /// Merge-updates an existing document.
    async fn update(&self, user_id: &UserId, update: DocumentUpdate) -> Result<(), DomainError>;

    /// All user documents, newest first by `created_at`.
    async fn list(&self) -> Result<Vec<UserDocument>, DomainError>;
}
