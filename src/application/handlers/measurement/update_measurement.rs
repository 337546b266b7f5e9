//! UpdateMeasurementHandler, DeleteMeasurementHandler and
//! ClearMeasurementsHandler - edits of existing history.

use std::sync::Arc;

use crate::domain::foundation::{MeasurementId, ServiceError, UserId};
use crate::domain::measurement::{MeasurementRecord, MeasurementUpdate};
use crate::ports::{Clock, MeasurementRepository};

/// Command to edit one history entry.
#[derive(Debug, Clone)]
pub struct UpdateMeasurementCommand {
    pub user_id: UserId,
    pub measurement_id: MeasurementId,
    pub update: MeasurementUpdate,
}

/// Handler for editing a history entry.
pub struct UpdateMeasurementHandler {
    measurements: Arc<dyn MeasurementRepository>,
    clock: Arc<dyn Clock>,
}

impl UpdateMeasurementHandler {
    pub fn new(measurements: Arc<dyn MeasurementRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            measurements,
            clock,
        }
    }

    pub async fn handle(&self, cmd: UpdateMeasurementCommand) -> Result<MeasurementRecord, ServiceError> {
        cmd.update.validate()?;
        super::ensure_ready(self.measurements.as_ref())?;

        let mut record = self
            .measurements
            .find(&cmd.user_id, &cmd.measurement_id)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("Measurement {} not found", cmd.measurement_id))
            })?;
        if cmd.update.is_empty() {
            return Ok(record);
        }

        record.apply(&cmd.update, self.clock.now());
        self.measurements.update(&cmd.user_id, &record).await?;
        tracing::info!(user_id = %cmd.user_id, measurement_id = %record.id, "Measurement updated");
        Ok(record)
    }
}

/// Handler for deleting a history entry.
pub struct DeleteMeasurementHandler {
    measurements: Arc<dyn MeasurementRepository>,
}

impl DeleteMeasurementHandler {
    pub fn new(measurements: Arc<dyn MeasurementRepository>) -> Self {
        Self { measurements }
    }

    pub async fn handle(&self, user_id: &UserId, measurement_id: &MeasurementId) -> Result<(), ServiceError> {
        super::ensure_ready(self.measurements.as_ref())?;
        self.measurements.delete(user_id, measurement_id).await?;
        tracing::info!(user_id = %user_id, measurement_id = %measurement_id, "Measurement deleted");
        Ok(())
    }
}

/// Handler for wiping a user's whole history.
pub struct ClearMeasurementsHandler {
    measurements: Arc<dyn MeasurementRepository>,
}

impl ClearMeasurementsHandler {
    pub fn new(measurements: Arc<dyn MeasurementRepository>) -> Self {
        Self { measurements }
    }

    /// Returns how many entries were deleted.
    pub async fn handle(&self, user_id: &UserId) -> Result<usize, ServiceError> {
        super::ensure_ready(self.measurements.as_ref())?;
        let deleted = self.measurements.delete_all(user_id).await?;
        tracing::info!(user_id = %user_id, deleted, "Measurement history cleared");
        Ok(deleted)
    }
}
