//! Application handlers.
//!
//! Command and query handlers for accounts, profiles, measurement history
//! and the admin views. The device-session workflows live in the
//! controllers one level up.

pub mod admin;
pub mod auth;
pub mod measurement;
pub mod profile;

pub use admin::{GetUserDetailHandler, ListUsersHandler, UserDetail};
pub use auth::{
    ResetPasswordCommand, ResetPasswordHandler, SignInCommand, SignInHandler, SignInResult,
    SignOutHandler, SignUpCommand, SignUpHandler, SignUpResult,
};
pub use measurement::{
    ClearMeasurementsHandler, DeleteMeasurementHandler, ListMeasurementsHandler, NewMeasurement,
    RecordMeasurementsCommand, RecordMeasurementsHandler, UpdateMeasurementCommand,
    UpdateMeasurementHandler,
};
pub use profile::{GetProfileHandler, UpdateProfileCommand, UpdateProfileHandler};
