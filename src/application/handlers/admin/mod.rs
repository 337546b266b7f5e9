//! Admin handlers. Every operation first checks that the caller is an admin.

mod get_user_detail;
mod list_users;

pub use get_user_detail::{GetUserDetailHandler, UserDetail};
pub use list_users::ListUsersHandler;

use crate::domain::foundation::{AuthenticatedUser, ServiceError};
use crate::domain::user::AdminPolicy;
use crate::ports::UserDocumentStore;

async fn authorize(
    store: &dyn UserDocumentStore,
    policy: &AdminPolicy,
    caller: &AuthenticatedUser,
) -> Result<(), ServiceError> {
    if !store.is_ready() {
        return Err(ServiceError::backend_unavailable(
            "Document store is not initialized",
        ));
    }
    if policy.is_admin_email(&caller.email) {
        return Ok(());
    }
    let profile = store.get(&caller.id).await?.map(|doc| doc.profile);
    if policy.is_admin(&caller.email, profile.as_ref()) {
        Ok(())
    } else {
        tracing::warn!(user_id = %caller.id, "Non-admin caller rejected");
        Err(ServiceError::forbidden())
    }
}
