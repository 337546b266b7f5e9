//! In-memory measurement history.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, MeasurementId, UserId};
use crate::domain::measurement::MeasurementRecord;
use crate::ports::{MeasurementRepository, SortOrder};

/// In-memory implementation of [`MeasurementRepository`].
#[derive(Debug)]
pub struct InMemoryMeasurementRepository {
    records: RwLock<HashMap<UserId, Vec<MeasurementRecord>>>,
    ready: AtomicBool,
}

impl InMemoryMeasurementRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            ready: AtomicBool::new(true),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Number of stored entries for a user.
    pub async fn count(&self, user_id: &UserId) -> usize {
        self.records
            .read()
            .await
            .get(user_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn ensure_ready(&self) -> Result<(), DomainError> {
        if self.ready.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::BackendUnavailable,
                "Measurement store is not initialized",
            ))
        }
    }
}

impl Default for InMemoryMeasurementRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(id: &MeasurementId) -> DomainError {
    DomainError::new(
        ErrorCode::MeasurementNotFound,
        format!("Measurement {} not found", id),
    )
}

#[async_trait]
impl MeasurementRepository for InMemoryMeasurementRepository {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn append(&self, user_id: &UserId, record: &MeasurementRecord) -> Result<(), DomainError> {
        self.ensure_ready()?;
        self.records
            .write()
            .await
            .entry(user_id.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn list(&self, user_id: &UserId, order: SortOrder) -> Result<Vec<MeasurementRecord>, DomainError> {
        self.ensure_ready()?;
        let mut records = self
            .records
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default();
        match order {
            SortOrder::NewestFirst => records.sort_by(|a, b| b.date_time.cmp(&a.date_time)),
            SortOrder::OldestFirst => records.sort_by(|a, b| a.date_time.cmp(&b.date_time)),
        }
        Ok(records)
    }

    async fn find(
        &self,
        user_id: &UserId,
        id: &MeasurementId,
    ) -> Result<Option<MeasurementRecord>, DomainError> {
        self.ensure_ready()?;
        Ok(self
            .records
            .read()
            .await
            .get(user_id)
            .and_then(|records| records.iter().find(|r| &r.id == id).cloned()))
    }

    async fn update(&self, user_id: &UserId, record: &MeasurementRecord) -> Result<(), DomainError> {
        self.ensure_ready()?;
        let mut records = self.records.write().await;
        let slot = records
            .get_mut(user_id)
            .and_then(|records| records.iter_mut().find(|r| r.id == record.id))
            .ok_or_else(|| not_found(&record.id))?;
        *slot = record.clone();
        Ok(())
    }

    async fn delete(&self, user_id: &UserId, id: &MeasurementId) -> Result<(), DomainError> {
        self.ensure_ready()?;
        let mut records = self.records.write().await;
        let entries = records.get_mut(user_id).ok_or_else(|| not_found(id))?;
        let before = entries.len();
        entries.retain(|r| &r.id != id);
        if entries.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn delete_all(&self, user_id: &UserId) -> Result<usize, DomainError> {
        self.ensure_ready()?;
        Ok(self
            .records
            .write()
            .await
            .remove(user_id)
            .map(|records| records.len())
            .unwrap_or(0))
    }
}
