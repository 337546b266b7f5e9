//! ListMeasurementsHandler - Query handler for a user's history.

use std::sync::Arc;

use crate::domain::foundation::{ServiceError, UserId};
use crate::domain::measurement::MeasurementRecord;
use crate::ports::{MeasurementRepository, SortOrder};

/// Handler for listing measurement history.
pub struct ListMeasurementsHandler {
    measurements: Arc<dyn MeasurementRepository>,
}

impl ListMeasurementsHandler {
    pub fn new(measurements: Arc<dyn MeasurementRepository>) -> Self {
        Self { measurements }
    }

    pub async fn handle(
        &self,
        user_id: &UserId,
        order: SortOrder,
    ) -> Result<Vec<MeasurementRecord>, ServiceError> {
        super::ensure_ready(self.measurements.as_ref())?;
        Ok(self.measurements.list(user_id, order).await?)
    }
}
