//! MeasurementRepository port for the per-user measurement history.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, MeasurementId, UserId};
use crate::domain::measurement::MeasurementRecord;

/// Ordering of history listings by `date_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Sub-collection of measurements under a user document.
#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// Whether the backend has been initialized.
    fn is_ready(&self) -> bool {
        true
    }

    async fn append(&self, user_id: &UserId, record: &MeasurementRecord) -> Result<(), DomainError>;

    async fn list(&self, user_id: &UserId, order: SortOrder) -> Result<Vec<MeasurementRecord>, DomainError>;

    async fn find(
        &self,
        user_id: &UserId,
        id: &MeasurementId,
    ) -> Result<Option<MeasurementRecord>, DomainError>;

    /// Replaces an existing entry. `ErrorCode::MeasurementNotFound` if absent.
    async fn update(&self, user_id: &UserId, record: &MeasurementRecord) -> Result<(), DomainError>;

    /// Removes one entry. `ErrorCode::MeasurementNotFound` if absent.
    async fn delete(&self, user_id: &UserId, id: &MeasurementId) -> Result<(), DomainError>;

    /// Batch-deletes the whole history, returning how many entries went.
    async fn delete_all(&self, user_id: &UserId) -> Result<usize, DomainError>;
}
