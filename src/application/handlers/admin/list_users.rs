//! ListUsersHandler - Query handler for the admin user list.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, ServiceError};
use crate::domain::user::{AdminPolicy, UserDocument};
use crate::ports::UserDocumentStore;

/// Lists every non-admin user, newest registration first.
pub struct ListUsersHandler {
    store: Arc<dyn UserDocumentStore>,
    admin_policy: AdminPolicy,
}

impl ListUsersHandler {
    pub fn new(store: Arc<dyn UserDocumentStore>, admin_policy: AdminPolicy) -> Self {
        Self {
            store,
            admin_policy,
        }
    }

    pub async fn handle(&self, caller: &AuthenticatedUser) -> Result<Vec<UserDocument>, ServiceError> {
        super::authorize(self.store.as_ref(), &self.admin_policy, caller).await?;

        let mut users: Vec<UserDocument> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|doc| !doc.is_admin() && !self.admin_policy.is_admin_email(&doc.profile.email))
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}
