//! Authentication types for the domain layer.
//!
//! These types describe a signed-in user and the ways signing in can fail.
//! They carry no provider dependencies: any email/password identity backend
//! can populate them through the `IdentityProvider` port.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use super::{UserId, ValidationError};

/// A user with a live session at the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The unique user identifier issued by the identity provider.
    pub id: UserId,

    /// Email the user signed in with.
    pub email: String,

    /// Whether the provider has verified the email address.
    pub email_verified: bool,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, email: impl Into<String>, email_verified: bool) -> Self {
        Self {
            id,
            email: email.into(),
            email_verified,
        }
    }
}

/// Email/password pair submitted to the identity provider.
///
/// The password is wrapped in a [`SecretString`] so it never shows up in
/// `Debug` output or logs.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    /// Builds credentials, trimming the email and rejecting empty values.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self, ValidationError> {
        let email = email.into().trim().to_string();
        if email.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if !email.contains('@') {
            return Err(ValidationError::invalid_format("email", "missing @ symbol"));
        }
        let password = password.into();
        if password.is_empty() {
            return Err(ValidationError::empty_field("password"));
        }
        Ok(Self {
            email,
            password: SecretString::new(password),
        })
    }

    /// Exposes the password to an adapter that must send it to the provider.
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

/// Authentication failures, provider-agnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("No account exists for this email")]
    UserNotFound,

    #[error("Wrong password")]
    WrongPassword,

    #[error("Email already registered")]
    EmailAlreadyInUse,

    #[error("Password too weak")]
    WeakPassword,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Network request failed")]
    NetworkError,

    #[error("Too many requests")]
    TooManyRequests,

    #[error("Account disabled")]
    UserDisabled,

    #[error("Invalid credential")]
    InvalidCredential,

    #[error("No user is signed in")]
    NotSignedIn,

    /// The identity backend is not configured or not reachable.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Sign-up succeeded at the provider but the user document could not
    /// be created; the identity has been rolled back.
    #[error("Profile creation failed: {0}")]
    ProfileCreationFailed(String),

    #[error("Authentication error: {0}")]
    Other(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Message suitable for showing on the sign-in and sign-up forms.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::UserNotFound => "No user found with this email.".to_string(),
            AuthError::WrongPassword => "Incorrect password.".to_string(),
            AuthError::EmailAlreadyInUse => "Email is already registered.".to_string(),
            AuthError::WeakPassword => "Password should be at least 6 characters.".to_string(),
            AuthError::InvalidEmail => "Invalid email address.".to_string(),
            AuthError::NetworkError => "Network error. Please check your connection.".to_string(),
            AuthError::TooManyRequests => {
                "Too many failed attempts. Please try again later.".to_string()
            }
            AuthError::UserDisabled => "This account has been disabled.".to_string(),
            AuthError::InvalidCredential => "Invalid email or password.".to_string(),
            AuthError::NotSignedIn => "Please sign in first.".to_string(),
            AuthError::ServiceUnavailable(_) => {
                "Authentication service is not configured. Please check setup.".to_string()
            }
            AuthError::ProfileCreationFailed(msg) | AuthError::Other(msg) => {
                format!("Authentication error: {}", msg)
            }
        }
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AuthError::NetworkError | AuthError::TooManyRequests | AuthError::ServiceUnavailable(_)
        )
    }
}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidFormat { ref field, .. } if field == "email" => {
                AuthError::InvalidEmail
            }
            other => AuthError::Other(other.to_string()),
        }
    }
}
