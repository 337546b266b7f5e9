//! RecordMeasurementsHandler - Command handler for manual history entries.

use std::sync::Arc;

use crate::domain::foundation::{ServiceError, Timestamp, UserId};
use crate::domain::measurement::{MeasurementEntry, MeasurementRecord};
use crate::domain::weighing::NutritionStatus;
use crate::ports::{Clock, MeasurementRepository};

/// One row of a manual entry form.
#[derive(Debug, Clone)]
pub struct NewMeasurement {
    pub weight: f64,
    pub height: f64,
    pub nutrition_status: NutritionStatus,
    /// Defaults to now.
    pub date_time: Option<Timestamp>,
}

/// Command to append several entries at once.
#[derive(Debug, Clone)]
pub struct RecordMeasurementsCommand {
    pub user_id: UserId,
    pub entries: Vec<NewMeasurement>,
}

/// Handler for recording manual measurements.
pub struct RecordMeasurementsHandler {
    measurements: Arc<dyn MeasurementRepository>,
    clock: Arc<dyn Clock>,
}

impl RecordMeasurementsHandler {
    pub fn new(measurements: Arc<dyn MeasurementRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            measurements,
            clock,
        }
    }

    /// Validates every entry first; nothing is written if any is invalid.
    pub async fn handle(
        &self,
        cmd: RecordMeasurementsCommand,
    ) -> Result<Vec<MeasurementRecord>, ServiceError> {
        let now = self.clock.now();
        let records = cmd
            .entries
            .iter()
            .map(|entry| {
                MeasurementEntry::new(
                    entry.weight,
                    entry.height,
                    entry.nutrition_status,
                    entry.date_time.unwrap_or(now),
                )
                .map(|valid| MeasurementRecord::from_entry(&valid, now))
            })
            .collect::<Result<Vec<_>, _>>()?;

        super::ensure_ready(self.measurements.as_ref())?;
        for record in &records {
            self.measurements.append(&cmd.user_id, record).await?;
        }
        tracing::info!(user_id = %cmd.user_id, count = records.len(), "Measurements recorded");
        Ok(records)
    }
}
