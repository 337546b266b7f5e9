//! RFID pairing domain.
//!
//! A user starts a pairing, taps an RFID card on the reader, and the reader
//! writes the scanned identifier back into the user's document. The pure
//! decision of what to do with each snapshot lives here; the controller in
//! the application layer performs the writes.

mod state;
mod status;

pub use state::{PairingDecision, PairingState};
pub use status::PairingStatus;
