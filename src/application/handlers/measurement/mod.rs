//! Measurement history handlers.

mod list_measurements;
mod record_measurements;
mod update_measurement;

pub use list_measurements::ListMeasurementsHandler;
pub use record_measurements::{NewMeasurement, RecordMeasurementsCommand, RecordMeasurementsHandler};
pub use update_measurement::{
    ClearMeasurementsHandler, DeleteMeasurementHandler, UpdateMeasurementCommand,
    UpdateMeasurementHandler,
};

use crate::domain::foundation::ServiceError;
use crate::ports::MeasurementRepository;

fn ensure_ready(measurements: &dyn MeasurementRepository) -> Result<(), ServiceError> {
    if measurements.is_ready() {
        Ok(())
    } else {
        Err(ServiceError::backend_unavailable(
            "Measurement store is not initialized",
        ))
    }
}
