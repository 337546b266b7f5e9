//! GetProfileHandler - Query handler for a user's profile.
//!
//! The stored age drifts as time passes. Reading a member profile with a
//! birthdate recomputes the age and writes it back when it changed.

use std::sync::Arc;

use crate::domain::foundation::{ServiceError, UserId};
use crate::domain::user::UserProfile;
use crate::ports::{Clock, DocumentUpdate, ProfilePatch, UserDocumentStore};

/// Handler for reading a profile.
pub struct GetProfileHandler {
    store: Arc<dyn UserDocumentStore>,
    clock: Arc<dyn Clock>,
}

impl GetProfileHandler {
    pub fn new(store: Arc<dyn UserDocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<UserProfile, ServiceError> {
        if !self.store.is_ready() {
            return Err(ServiceError::backend_unavailable(
                "Document store is not initialized",
            ));
        }
        let mut profile = self
            .store
            .get(user_id)
            .await?
            .map(|document| document.profile)
            .ok_or_else(|| ServiceError::not_found("User profile not found"))?;

        let today = self.clock.today();
        if profile.is_admin() || !profile.age_is_stale(today) {
            return Ok(profile);
        }

        if let Some(age) = profile.current_age(today) {
            profile.age_years = age.years;
            profile.age_months = age.months;
            let patch = ProfilePatch {
                age: Some(age),
                ..Default::default()
            };
            // Showing the fresh age matters more than persisting it.
            if let Err(err) = self.store.update(user_id, DocumentUpdate::profile(patch)).await {
                tracing::warn!(user_id = %user_id, error = %err, "Could not persist refreshed age");
            } else {
                tracing::debug!(user_id = %user_id, age = %age, "Refreshed stored age");
            }
        }
        Ok(profile)
    }
}
