//! In-memory backend adapters.
//!
//! Used by the tests and by the local simulator binary in place of the
//! hosted document database and identity provider.

mod identity_provider;
mod measurement_repository;
mod user_store;

pub use identity_provider::InMemoryIdentityProvider;
pub use measurement_repository::InMemoryMeasurementRepository;
pub use user_store::InMemoryUserStore;
