//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Backend Ports
//!
//! - `UserDocumentStore` - Per-user document read/write/merge-update
//! - `DocumentSubscriber` - Real-time snapshots of a user document
//! - `MeasurementRepository` - Measurement history sub-collection
//! - `IdentityProvider` - Email/password authentication and session observer
//!
//! ## Local Ports
//!
//! - `Clock` - Source of "now"
//! - `SessionNotifier` - User-visible notices

mod clock;
mod document_subscriber;
mod identity_provider;
mod measurement_repository;
mod session_notifier;
mod user_document_store;

pub use clock::Clock;
pub use document_subscriber::{DocumentSubscriber, SnapshotListener, Subscription};
pub use identity_provider::IdentityProvider;
pub use measurement_repository::{MeasurementRepository, SortOrder};
pub use session_notifier::{SessionNotice, SessionNotifier};
pub use user_document_store::{DocumentUpdate, ProfilePatch, UserDocumentStore};
