//! GetUserDetailHandler - Query handler for one user's document and history.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, ServiceError, UserId};
use crate::domain::measurement::MeasurementRecord;
use crate::domain::user::{AdminPolicy, UserDocument};
use crate::ports::{MeasurementRepository, SortOrder, UserDocumentStore};

/// A user's document together with their measurement history.
#[derive(Debug, Clone)]
pub struct UserDetail {
    pub document: UserDocument,
    /// Newest first.
    pub measurements: Vec<MeasurementRecord>,
}

pub struct GetUserDetailHandler {
    store: Arc<dyn UserDocumentStore>,
    measurements: Arc<dyn MeasurementRepository>,
    admin_policy: AdminPolicy,
}

impl GetUserDetailHandler {
    pub fn new(
        store: Arc<dyn UserDocumentStore>,
        measurements: Arc<dyn MeasurementRepository>,
        admin_policy: AdminPolicy,
    ) -> Self {
        Self {
            store,
            measurements,
            admin_policy,
        }
    }

    pub async fn handle(
        &self,
        caller: &AuthenticatedUser,
        user_id: &UserId,
    ) -> Result<UserDetail, ServiceError> {
        super::authorize(self.store.as_ref(), &self.admin_policy, caller).await?;

        let document = self
            .store
            .get(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("User {} not found", user_id)))?;
        let measurements = self.measurements.list(user_id, SortOrder::NewestFirst).await?;

        Ok(UserDetail {
            document,
            measurements,
        })
    }
}
