//! Clock port - source of "now" for timeout checks and document stamps.

use chrono::NaiveDate;

use crate::domain::foundation::Timestamp;

/// Supplies the current instant.
///
/// Controllers never call `Timestamp::now()` directly so that timeout
/// behaviour can be driven from tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    /// Calendar date of `now()` in UTC.
    fn today(&self) -> NaiveDate {
        self.now().as_datetime().date_naive()
    }
}
