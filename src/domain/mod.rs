//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, timeout policy)
//! - `pairing` - RFID pairing sub-document and snapshot decisions
//! - `weighing` - Weighing session sub-document, selections and results
//! - `user` - Profile, age, admin rule and the user document
//! - `measurement` - Measurement history entries

pub mod foundation;
pub mod measurement;
pub mod pairing;
pub mod user;
pub mod weighing;
