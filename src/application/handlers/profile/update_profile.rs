//! UpdateProfileHandler - Command handler for editing profile fields.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::domain::foundation::{ServiceError, UserId, ValidationError};
use crate::domain::user::{Age, Gender};
use crate::ports::{Clock, DocumentUpdate, ProfilePatch, UserDocumentStore};

/// Command to update a profile. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileCommand {
    pub name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

/// Handler for profile edits.
pub struct UpdateProfileHandler {
    store: Arc<dyn UserDocumentStore>,
    clock: Arc<dyn Clock>,
}

impl UpdateProfileHandler {
    pub fn new(store: Arc<dyn UserDocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Applies the edit. A new birthdate also recomputes the stored age.
    pub async fn handle(
        &self,
        user_id: &UserId,
        cmd: UpdateProfileCommand,
    ) -> Result<ProfilePatch, ServiceError> {
        let name = match cmd.name {
            Some(name) if name.trim().is_empty() => {
                return Err(ValidationError::empty_field("name").into())
            }
            Some(name) => Some(name.trim().to_string()),
            None => None,
        };
        let patch = ProfilePatch {
            name,
            birthdate: cmd.birthdate,
            gender: cmd.gender,
            age: cmd
                .birthdate
                .map(|birthdate| Age::between(birthdate, self.clock.today())),
        };
        if patch.is_empty() {
            return Ok(patch);
        }

        if !self.store.is_ready() {
            return Err(ServiceError::backend_unavailable(
                "Document store is not initialized",
            ));
        }
        self.store
            .update(user_id, DocumentUpdate::profile(patch.clone()))
            .await?;
        tracing::info!(user_id = %user_id, "Profile updated");
        Ok(patch)
    }
}
