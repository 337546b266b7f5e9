//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, errors and the timeout policy that
//! form the vocabulary of the pairing and weighing domains.

mod auth;
mod errors;
mod ids;
mod service_error;
mod state_machine;
mod timeout;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser, Credentials};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{MeasurementId, UserId};
pub use service_error::ServiceError;
pub use state_machine::StateMachine;
pub use timeout::{is_expired, TimeoutPolicy, PAIRING_TIMEOUT_MS, WEIGHING_TIMEOUT_MS};
pub use timestamp::Timestamp;
