//! SignOutHandler and ResetPasswordHandler.

use std::sync::Arc;

use crate::domain::foundation::{AuthError, ValidationError};
use crate::ports::IdentityProvider;

/// Handler for ending the current session.
pub struct SignOutHandler {
    identity: Arc<dyn IdentityProvider>,
}

impl SignOutHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    pub async fn handle(&self) -> Result<(), AuthError> {
        let user = self.identity.current_user();
        self.identity.sign_out().await?;
        if let Some(user) = user {
            tracing::info!(user_id = %user.id, "User signed out");
        }
        Ok(())
    }
}

/// Command to send a password-reset mail.
#[derive(Debug, Clone)]
pub struct ResetPasswordCommand {
    pub email: String,
}

/// Handler for password-reset requests.
pub struct ResetPasswordHandler {
    identity: Arc<dyn IdentityProvider>,
}

impl ResetPasswordHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    pub async fn handle(&self, cmd: ResetPasswordCommand) -> Result<(), AuthError> {
        let email = cmd.email.trim();
        if email.is_empty() {
            return Err(ValidationError::empty_field("email").into());
        }
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail);
        }
        if !self.identity.is_ready() {
            return Err(AuthError::service_unavailable(
                "Identity provider is not initialized",
            ));
        }
        self.identity.send_password_reset(email).await?;
        tracing::info!("Password reset mail requested");
        Ok(())
    }
}
