//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `memory` - In-memory document store, measurement history and identity provider
//! - `clock` - System and manually driven clocks
//! - `notifier` - Log-based and recording session notifiers
//! - `device` - Simulated RFID reader and scale

pub mod clock;
pub mod device;
pub mod memory;
pub mod notifier;

pub use clock::{ManualClock, SystemClock};
pub use device::{SimulatedRfidReader, SimulatedScale};
pub use memory::{InMemoryIdentityProvider, InMemoryMeasurementRepository, InMemoryUserStore};
pub use notifier::{RecordingNotifier, TracingNotifier};
