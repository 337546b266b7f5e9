//! Weighing session domain.
//!
//! The parent records an eating pattern and the child's response, the app
//! opens a session, and the IoT scale measures weight and height and writes
//! the result into the same user document.

mod measurement;
mod selection;
mod session;
mod status;

pub use measurement::{MeasurementResult, NutritionStatus};
pub use selection::{ChildResponse, EatingPattern, Selection, ValidSelection};
pub use session::{WeighingDecision, WeighingSession};
pub use status::WeighingStatus;
