//! DocumentSubscriber port - real-time snapshots of a user document.
//!
//! Subscribing returns a [`Subscription`] that yields full document
//! snapshots in commit order. Dropping the subscription (or calling
//! [`Subscription::unsubscribe`]) detaches it from the store.

use async_trait::async_trait;
use std::fmt;
use tokio::sync::mpsc;

use crate::domain::foundation::{DomainError, ServiceError, UserId};
use crate::domain::user::UserDocument;

/// Consumer of document snapshots.
///
/// Every snapshot is the full authoritative document, never a delta.
/// Implementations must tolerate the same snapshot being delivered twice.
#[async_trait]
pub trait SnapshotListener: Send + Sync {
    async fn on_snapshot(&self, snapshot: &UserDocument) -> Result<(), ServiceError>;

    /// Listener name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to changes of one user document.
#[async_trait]
pub trait DocumentSubscriber: Send + Sync {
    /// Starts a subscription. The current document, if any, is delivered
    /// first.
    ///
    /// Returns `ErrorCode::BackendUnavailable` when the store is not
    /// initialized.
    async fn subscribe(&self, user_id: &UserId) -> Result<Subscription, DomainError>;
}

type UnsubscribeFn = Box<dyn FnOnce() + Send>;

/// Live subscription to a user document.
pub struct Subscription {
    user_id: UserId,
    receiver: mpsc::UnboundedReceiver<UserDocument>,
    on_unsubscribe: Option<UnsubscribeFn>,
}

impl Subscription {
    /// Wraps the receiving end of a snapshot channel. `on_unsubscribe` runs
    /// exactly once, when the subscription is dropped.
    pub fn new(
        user_id: UserId,
        receiver: mpsc::UnboundedReceiver<UserDocument>,
        on_unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            user_id,
            receiver,
            on_unsubscribe: Some(Box::new(on_unsubscribe)),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Waits for the next snapshot. `None` once the store side has closed.
    pub async fn next(&mut self) -> Option<UserDocument> {
        self.receiver.recv().await
    }

    /// Next already-queued snapshot, without waiting.
    pub fn try_next(&mut self) -> Option<UserDocument> {
        self.receiver.try_recv().ok()
    }

    /// Detaches from the store.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.receiver.close();
        if let Some(on_unsubscribe) = self.on_unsubscribe.take() {
            on_unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("user_id", &self.user_id)
            .field("attached", &self.on_unsubscribe.is_some())
            .finish()
    }
}
