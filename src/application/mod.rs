//! Application layer - Controllers, Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! The pairing and weighing controllers react to document snapshots
//! delivered by the subscription bridge; the handlers serve one-shot
//! commands and queries.

mod context;
pub mod handlers;
mod pairing_controller;
mod subscription_bridge;
mod weighing_controller;

pub use context::{AppContext, Ports};
pub use handlers::*;
pub use pairing_controller::{PairingController, PairingOutcome};
pub use subscription_bridge::{BridgeHandle, ListenerFailure, SubscriptionBridge};
pub use weighing_controller::{WeighingController, WeighingOutcome};
