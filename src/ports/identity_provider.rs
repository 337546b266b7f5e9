//! Identity provider port for email/password authentication.
//!
//! The provider verifies credentials, persists the session, and sends
//! password-reset mails. The app only consumes its request/response and
//! session-observer contracts.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::foundation::{AuthError, AuthenticatedUser, Credentials, UserId};

/// Email/password identity backend.
///
/// # Contract
///
/// Implementations must:
/// - Return `AuthError::ServiceUnavailable` when not initialized
/// - Publish every sign-in and sign-out on the `watch_session` channel
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Whether the backend has been initialized.
    fn is_ready(&self) -> bool {
        true
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthenticatedUser, AuthError>;

    /// Creates the identity and signs it in.
    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthenticatedUser, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Removes an identity. Used to roll back a sign-up whose user
    /// document could not be created.
    async fn delete_user(&self, user_id: &UserId) -> Result<(), AuthError>;

    fn current_user(&self) -> Option<AuthenticatedUser>;

    /// Observer of the current session; yields `None` when signed out.
    fn watch_session(&self) -> watch::Receiver<Option<AuthenticatedUser>>;
}
