//! Timbang - RFID pairing and weighing sessions for child growth tracking
//!
//! This crate holds the client-side core of a growth tracking app: it
//! pairs a child's RFID card with their account, runs weigh-ins on an IoT
//! scale through a shared per-user document, and keeps the measurement
//! history. The device and the app never talk directly; both read and
//! write the user's document in the store.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
