//! SignUpHandler - Command handler for registering a new account.
//!
//! Creates the identity first, then the user document. When the document
//! cannot be written the identity is deleted again so no account exists
//! without a profile.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::domain::foundation::{AuthError, AuthenticatedUser, Credentials};
use crate::domain::user::{AdminPolicy, Gender, RegistrationDetails, UserDocument, UserProfile};
use crate::ports::{Clock, IdentityProvider, UserDocumentStore};

/// Command to register.
///
/// Profile fields are ignored for the admin email.
#[derive(Debug, Clone)]
pub struct SignUpCommand {
    pub email: String,
    pub password: String,
    pub name: String,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct SignUpResult {
    pub user: AuthenticatedUser,
    pub document: UserDocument,
}

/// Handler for registering.
pub struct SignUpHandler {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn UserDocumentStore>,
    clock: Arc<dyn Clock>,
    admin_policy: AdminPolicy,
}

impl SignUpHandler {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn UserDocumentStore>,
        clock: Arc<dyn Clock>,
        admin_policy: AdminPolicy,
    ) -> Self {
        Self {
            identity,
            store,
            clock,
            admin_policy,
        }
    }

    pub async fn handle(&self, cmd: SignUpCommand) -> Result<SignUpResult, AuthError> {
        // 1. Validate everything before touching the provider
        let credentials = Credentials::new(cmd.email, cmd.password)?;
        let is_admin = self.admin_policy.is_admin_email(&credentials.email);
        let details = if is_admin {
            None
        } else {
            Some(RegistrationDetails::new(cmd.name, cmd.birthdate, cmd.gender)?)
        };
        if !self.identity.is_ready() {
            return Err(AuthError::service_unavailable(
                "Identity provider is not initialized",
            ));
        }
        if !self.store.is_ready() {
            return Err(AuthError::service_unavailable(
                "Document store is not initialized",
            ));
        }

        // 2. Create the identity
        let user = self.identity.sign_up(&credentials).await?;

        // 3. Create the user document
        let profile = match details {
            Some(details) => UserProfile::member(&user.email, details, self.clock.today()),
            None => UserProfile::admin(&user.email),
        };
        let document = UserDocument::new(user.id.clone(), profile, self.clock.now());

        if let Err(err) = self.store.create(&document).await {
            // 4. Roll back the identity
            tracing::warn!(user_id = %user.id, error = %err, "Profile creation failed, deleting identity");
            if let Err(rollback) = self.identity.delete_user(&user.id).await {
                tracing::warn!(user_id = %user.id, error = %rollback, "Identity rollback failed");
            }
            return Err(AuthError::ProfileCreationFailed(err.message));
        }

        tracing::info!(user_id = %user.id, is_admin, "User registered");
        Ok(SignUpResult { user, document })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryIdentityProvider, InMemoryUserStore, ManualClock};
    use crate::domain::user::Role;

    struct Fixture {
        identity: Arc<InMemoryIdentityProvider>,
        store: Arc<InMemoryUserStore>,
        handler: SignUpHandler,
    }

    fn fixture() -> Fixture {
        // 2024-05-10T00:00:00Z
        let clock = Arc::new(ManualClock::at_millis(1_715_299_200_000));
        let identity = Arc::new(InMemoryIdentityProvider::new());
        let store = Arc::new(InMemoryUserStore::new(clock.clone()));
        let handler = SignUpHandler::new(
            identity.clone(),
            store.clone(),
            clock,
            AdminPolicy::new("admin@gmail.com"),
        );
        Fixture {
            identity,
            store,
            handler,
        }
    }

    fn cmd(email: &str) -> SignUpCommand {
        SignUpCommand {
            email: email.to_string(),
            password: "rahasia1".to_string(),
            name: "Budi".to_string(),
            birthdate: NaiveDate::from_ymd_opt(2021, 3, 15),
            gender: Some(Gender::Male),
        }
    }

    #[tokio::test]
    async fn member_gets_profile_with_age() {
        let f = fixture();

        let result = f.handler.handle(cmd("ibu@example.com")).await.unwrap();

        let stored = f.store.document(&result.user.id).await.unwrap();
        assert_eq!(stored.profile.name, "Budi");
        assert_eq!(stored.profile.role, Role::User);
        assert_eq!(stored.profile.age_years, 3);
        assert_eq!(stored.profile.age_months, 1);
        assert!(!stored.is_admin());
    }

    #[tokio::test]
    async fn admin_email_gets_admin_profile() {
        let f = fixture();
        let mut command = cmd("Admin@Gmail.com");
        command.name = String::new();

        let result = f.handler.handle(command).await.unwrap();

        assert!(result.document.is_admin());
        assert_eq!(result.document.profile.name, "Admin");
    }

    #[tokio::test]
    async fn missing_name_fails_before_provider() {
        let f = fixture();
        let mut command = cmd("ibu@example.com");
        command.name = "  ".to_string();

        let err = f.handler.handle(command).await.unwrap_err();

        assert!(matches!(err, AuthError::Other(_)));
        assert_eq!(f.identity.account_count(), 0);
    }

    #[tokio::test]
    async fn failed_profile_write_rolls_back_identity() {
        let f = fixture();
        f.store.fail_writes("PERMISSION_DENIED");

        let err = f.handler.handle(cmd("ibu@example.com")).await.unwrap_err();

        assert_eq!(
            err,
            AuthError::ProfileCreationFailed("PERMISSION_DENIED".to_string())
        );
        assert_eq!(f.identity.account_count(), 0);
        assert!(f.identity.current_user().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let f = fixture();
        f.handler.handle(cmd("ibu@example.com")).await.unwrap();

        let err = f.handler.handle(cmd("ibu@example.com")).await.unwrap_err();

        assert_eq!(err, AuthError::EmailAlreadyInUse);
    }

    #[tokio::test]
    async fn unready_store_fails_before_identity_is_created() {
        let f = fixture();
        f.store.set_ready(false);

        let err = f.handler.handle(cmd("ibu@example.com")).await.unwrap_err();

        assert!(matches!(err, AuthError::ServiceUnavailable(_)));
        assert_eq!(f.identity.account_count(), 0);
    }
}
