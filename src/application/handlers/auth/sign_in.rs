//! SignInHandler - Command handler for email/password sign-in.

use std::sync::Arc;

use crate::domain::foundation::{AuthError, AuthenticatedUser, Credentials};
use crate::domain::user::{AdminPolicy, UserProfile};
use crate::ports::{IdentityProvider, UserDocumentStore};

/// Command to sign in.
#[derive(Debug, Clone)]
pub struct SignInCommand {
    pub email: String,
    pub password: String,
}

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct SignInResult {
    pub user: AuthenticatedUser,
    /// `None` when the user document could not be read.
    pub profile: Option<UserProfile>,
    pub is_admin: bool,
}

/// Handler for signing in.
pub struct SignInHandler {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn UserDocumentStore>,
    admin_policy: AdminPolicy,
}

impl SignInHandler {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn UserDocumentStore>,
        admin_policy: AdminPolicy,
    ) -> Self {
        Self {
            identity,
            store,
            admin_policy,
        }
    }

    pub async fn handle(&self, cmd: SignInCommand) -> Result<SignInResult, AuthError> {
        let credentials = Credentials::new(cmd.email, cmd.password)?;
        if !self.identity.is_ready() {
            return Err(AuthError::service_unavailable(
                "Identity provider is not initialized",
            ));
        }

        let user = self.identity.sign_in(&credentials).await?;

        // The session is valid even if the profile cannot be read right now.
        let profile = match self.store.get(&user.id).await {
            Ok(document) => document.map(|d| d.profile),
            Err(err) => {
                tracing::warn!(user_id = %user.id, error = %err, "Could not load profile after sign-in");
                None
            }
        };
        let is_admin = self.admin_policy.is_admin(&user.email, profile.as_ref());

        tracing::info!(user_id = %user.id, is_admin, "User signed in");
        Ok(SignInResult {
            user,
            profile,
            is_admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryIdentityProvider, InMemoryUserStore, SystemClock};
    use crate::domain::foundation::Timestamp;
    use crate::domain::user::{RegistrationDetails, UserDocument};
    use chrono::NaiveDate;

    struct Fixture {
        identity: Arc<InMemoryIdentityProvider>,
        store: Arc<InMemoryUserStore>,
        handler: SignInHandler,
    }

    fn fixture(identity: InMemoryIdentityProvider) -> Fixture {
        let identity = Arc::new(identity);
        let store = Arc::new(InMemoryUserStore::new(Arc::new(SystemClock)));
        let handler = SignInHandler::new(
            identity.clone(),
            store.clone(),
            AdminPolicy::new("admin@gmail.com"),
        );
        Fixture {
            identity,
            store,
            handler,
        }
    }

    fn cmd(email: &str, password: &str) -> SignInCommand {
        SignInCommand {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn signs_in_and_loads_profile() {
        let f = fixture(InMemoryIdentityProvider::new());
        let user = f
            .identity
            .sign_up(&Credentials::new("ibu@example.com", "rahasia1").unwrap())
            .await
            .unwrap();
        let details = RegistrationDetails::new("Siti", NaiveDate::from_ymd_opt(2020, 1, 1), None).unwrap();
        let profile = UserProfile::member(
            "ibu@example.com",
            details,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        f.store
            .create(&UserDocument::new(user.id.clone(), profile, Timestamp::now()))
            .await
            .unwrap();

        let result = f.handler.handle(cmd("ibu@example.com", "rahasia1")).await.unwrap();

        assert_eq!(result.user.id, user.id);
        assert_eq!(result.profile.unwrap().name, "Siti");
        assert!(!result.is_admin);
    }

    #[tokio::test]
    async fn admin_email_is_admin_without_profile() {
        let f = fixture(InMemoryIdentityProvider::new().with_account("admin@gmail.com", "rahasia1"));

        let result = f.handler.handle(cmd("admin@gmail.com", "rahasia1")).await.unwrap();

        assert!(result.is_admin);
        assert!(result.profile.is_none());
    }

    #[tokio::test]
    async fn unreadable_profile_does_not_fail_sign_in() {
        let f = fixture(InMemoryIdentityProvider::new().with_account("ibu@example.com", "rahasia1"));
        f.store.fail_reads("UNAVAILABLE");

        let result = f.handler.handle(cmd("ibu@example.com", "rahasia1")).await.unwrap();

        assert!(result.profile.is_none());
    }

    #[tokio::test]
    async fn wrong_password_is_reported() {
        let f = fixture(InMemoryIdentityProvider::new().with_account("ibu@example.com", "rahasia1"));

        let err = f.handler.handle(cmd("ibu@example.com", "salah123")).await.unwrap_err();

        assert_eq!(err, AuthError::WrongPassword);
        assert_eq!(err.user_message(), "Incorrect password.");
    }

    #[tokio::test]
    async fn malformed_email_never_reaches_provider() {
        let f = fixture(InMemoryIdentityProvider::new());
        f.identity.set_ready(false);

        let err = f.handler.handle(cmd("not-an-email", "rahasia1")).await.unwrap_err();

        assert_eq!(err, AuthError::InvalidEmail);
    }

    #[tokio::test]
    async fn unready_provider_is_unavailable() {
        let f = fixture(InMemoryIdentityProvider::new());
        f.identity.set_ready(false);

        let err = f.handler.handle(cmd("ibu@example.com", "rahasia1")).await.unwrap_err();

        assert!(matches!(err, AuthError::ServiceUnavailable(_)));
    }
}
