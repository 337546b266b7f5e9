//! Measurement history domain.

mod record;

pub use record::{MeasurementEntry, MeasurementRecord, MeasurementUpdate};
