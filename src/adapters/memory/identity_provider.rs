//! In-memory identity provider.
//!
//! Accounts live in a map keyed by lower-cased email. The provider keeps one
//! signed-in session at a time, as a device-local auth SDK does, and
//! publishes it on a `watch` channel.
//!
//! # Example
//!
//! ```ignore
//! let provider = InMemoryIdentityProvider::new()
//!     .with_account("ibu@example.com", "rahasia1");
//!
//! let user = provider.sign_in(&Credentials::new("ibu@example.com", "rahasia1")?).await?;
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;

use crate::domain::foundation::{AuthError, AuthenticatedUser, Credentials, UserId};
use crate::ports::IdentityProvider;

const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    user: AuthenticatedUser,
    password: SecretString,
}

/// In-memory implementation of [`IdentityProvider`].
pub struct InMemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    session: watch::Sender<Option<AuthenticatedUser>>,
    ready: AtomicBool,
    force_error: Mutex<Option<AuthError>>,
    password_resets: Mutex<Vec<String>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            session,
            ready: AtomicBool::new(true),
            force_error: Mutex::new(None),
            password_resets: Mutex::new(Vec::new()),
        }
    }

    /// Registers an account without signing it in.
    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.insert_account(email, password);
        self
    }

    /// Forces every credential call to fail with `error`.
    pub fn with_error(self, error: AuthError) -> Self {
        *lock(&self.force_error) = Some(error);
        self
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Emails that a password reset was sent to.
    pub fn password_resets(&self) -> Vec<String> {
        lock(&self.password_resets).clone()
    }

    pub fn account_count(&self) -> usize {
        lock(&self.accounts).len()
    }

    fn insert_account(&self, email: &str, password: &str) -> AuthenticatedUser {
        let user = AuthenticatedUser::new(UserId::generate(), email.trim(), false);
        lock(&self.accounts).insert(
            email.trim().to_lowercase(),
            Account {
                user: user.clone(),
                password: SecretString::new(password.to_string()),
            },
        );
        user
    }

    fn check(&self) -> Result<(), AuthError> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(AuthError::service_unavailable(
                "Identity provider is not initialized",
            ));
        }
        match lock(&self.force_error).clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthenticatedUser, AuthError> {
        self.check()?;
        let user = {
            let accounts = lock(&self.accounts);
            let account = accounts
                .get(&credentials.email.to_lowercase())
                .ok_or(AuthError::UserNotFound)?;
            if account.password.expose_secret() != credentials.password() {
                return Err(AuthError::WrongPassword);
            }
            account.user.clone()
        };
        self.session.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthenticatedUser, AuthError> {
        self.check()?;
        if credentials.password().chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        if lock(&self.accounts).contains_key(&credentials.email.to_lowercase()) {
            return Err(AuthError::EmailAlreadyInUse);
        }
        let user = self.insert_account(&credentials.email, credentials.password());
        self.session.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(AuthError::service_unavailable(
                "Identity provider is not initialized",
            ));
        }
        self.session.send_replace(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.check()?;
        let email = email.trim().to_lowercase();
        if !lock(&self.accounts).contains_key(&email) {
            return Err(AuthError::UserNotFound);
        }
        lock(&self.password_resets).push(email);
        Ok(())
    }

    async fn delete_user(&self, user_id: &UserId) -> Result<(), AuthError> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(AuthError::service_unavailable(
                "Identity provider is not initialized",
            ));
        }
        lock(&self.accounts).retain(|_, account| &account.user.id != user_id);
        self.session.send_if_modified(|current| {
            if current.as_ref().map(|u| &u.id) == Some(user_id) {
                *current = None;
                true
            } else {
                false
            }
        });
        Ok(())
    }

    fn current_user(&self) -> Option<AuthenticatedUser> {
        self.session.borrow().clone()
    }

    fn watch_session(&self) -> watch::Receiver<Option<AuthenticatedUser>> {
        self.session.subscribe()
    }
}
