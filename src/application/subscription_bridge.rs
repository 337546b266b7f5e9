//! SubscriptionBridge - feeds document snapshots to the controllers.
//!
//! One bridge wraps one live [`Subscription`] and a list of
//! [`SnapshotListener`]s. Snapshots are handed to every listener in the
//! order the store committed them. A listener failure is logged and does
//! not stop the other listeners or later snapshots.
//!
//! # Example
//!
//! ```ignore
//! let handle = SubscriptionBridge::open(subscriber.as_ref(), store.clone(), &user_id)
//!     .await?
//!     .with_listener(pairing.clone())
//!     .with_listener(weighing.clone())
//!     .spawn();
//!
//! // Screen revisited: re-evaluate timeouts without waiting for a change.
//! handle.check_now().await?;
//!
//! // Screen torn down.
//! handle.stop().await;
//! ```

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::domain::foundation::{ServiceError, UserId};
use crate::domain::user::UserDocument;
use crate::ports::{DocumentSubscriber, SnapshotListener, Subscription, UserDocumentStore};

/// A listener that returned an error for a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerFailure {
    pub listener: &'static str,
    pub error: ServiceError,
}

/// Listeners plus what `check_now` needs to re-read the document.
#[derive(Clone)]
struct Dispatcher {
    user_id: UserId,
    store: Arc<dyn UserDocumentStore>,
    listeners: Vec<Arc<dyn SnapshotListener>>,
}

impl Dispatcher {
    async fn dispatch(&self, snapshot: &UserDocument) -> Vec<ListenerFailure> {
        let mut failures = Vec::new();
        for listener in &self.listeners {
            if let Err(error) = listener.on_snapshot(snapshot).await {
                tracing::warn!(
                    user_id = %self.user_id,
                    listener = listener.name(),
                    error = %error,
                    "Snapshot listener failed"
                );
                failures.push(ListenerFailure {
                    listener: listener.name(),
                    error,
                });
            }
        }
        failures
    }

    async fn check_now(&self) -> Result<Vec<ListenerFailure>, ServiceError> {
        if !self.store.is_ready() {
            return Err(ServiceError::backend_unavailable(
                "Document store is not initialized",
            ));
        }
        let snapshot = self.store.get(&self.user_id).await?.ok_or_else(|| {
            ServiceError::not_found(format!("User {} not found", self.user_id))
        })?;
        Ok(self.dispatch(&snapshot).await)
    }
}

/// Bridges one user's document subscription to snapshot listeners.
pub struct SubscriptionBridge {
    dispatcher: Dispatcher,
    subscription: Subscription,
}

impl SubscriptionBridge {
    /// Subscribes to the user's document. Listeners are added afterwards.
    pub async fn open(
        subscriber: &dyn DocumentSubscriber,
        store: Arc<dyn UserDocumentStore>,
        user_id: &UserId,
    ) -> Result<Self, ServiceError> {
        let subscription = subscriber.subscribe(user_id).await?;
        tracing::debug!(user_id = %user_id, "Subscription bridge opened");
        Ok(Self {
            dispatcher: Dispatcher {
                user_id: user_id.clone(),
                store,
                listeners: Vec::new(),
            },
            subscription,
        })
    }

    pub fn with_listener(mut self, listener: Arc<dyn SnapshotListener>) -> Self {
        self.dispatcher.listeners.push(listener);
        self
    }

    pub fn user_id(&self) -> &UserId {
        &self.dispatcher.user_id
    }

    /// Hands `snapshot` to every listener.
    pub async fn dispatch(&self, snapshot: &UserDocument) -> Vec<ListenerFailure> {
        self.dispatcher.dispatch(snapshot).await
    }

    /// Waits for the next snapshot and dispatches it. `false` once the
    /// subscription has closed.
    pub async fn next(&mut self) -> bool {
        match self.subscription.next().await {
            Some(snapshot) => {
                self.dispatcher.dispatch(&snapshot).await;
                true
            }
            None => false,
        }
    }

    /// Dispatches every snapshot already queued, including the ones the
    /// listeners' own writes produce along the way. Returns how many were
    /// handled.
    pub async fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Some(snapshot) = self.subscription.try_next() {
            self.dispatcher.dispatch(&snapshot).await;
            handled += 1;
        }
        handled
    }

    /// Re-reads the document and dispatches it, for when no change will
    /// arrive on its own (e.g. the screen was revisited).
    pub async fn check_now(&self) -> Result<Vec<ListenerFailure>, ServiceError> {
        self.dispatcher.check_now().await
    }

    /// Dispatches snapshots until the subscription closes.
    pub async fn run(mut self) {
        while self.next().await {}
        tracing::debug!(user_id = %self.dispatcher.user_id, "Subscription bridge closed");
    }

    /// Runs the bridge on a background task.
    pub fn spawn(self) -> BridgeHandle {
        let dispatcher = self.dispatcher.clone();
        let task = tokio::spawn(self.run());
        BridgeHandle {
            dispatcher,
            task: Some(task),
        }
    }

    /// Unsubscribes.
    pub fn close(self) {
        tracing::debug!(user_id = %self.dispatcher.user_id, "Subscription bridge closed");
    }
}

/// A bridge running in the background. Dropping the handle stops it and
/// releases the subscription.
pub struct BridgeHandle {
    dispatcher: Dispatcher,
    task: Option<JoinHandle<()>>,
}

impl BridgeHandle {
    pub fn user_id(&self) -> &UserId {
        &self.dispatcher.user_id
    }

    pub async fn check_now(&self) -> Result<Vec<ListenerFailure>, ServiceError> {
        self.dispatcher.check_now().await
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Stops the bridge and waits until its subscription is released.
    pub async fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // Cancellation is the expected outcome.
            let _ = task.await;
        }
        tracing::debug!(user_id = %self.dispatcher.user_id, "Subscription bridge stopped");
    }
}

impl Drop for BridgeHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryUserStore, ManualClock};
    use crate::domain::pairing::PairingState;
    use crate::domain::user::UserProfile;
    use crate::ports::{Clock, DocumentUpdate};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingListener {
        seen: Mutex<Vec<UserDocument>>,
        fail: bool,
    }

    impl RecordingListener {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
                fail: true,
            })
        }

        fn count(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SnapshotListener for RecordingListener {
        async fn on_snapshot(&self, snapshot: &UserDocument) -> Result<(), ServiceError> {
            self.seen.lock().unwrap().push(snapshot.clone());
            if self.fail {
                return Err(ServiceError::write_failed("boom"));
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "RecordingListener"
        }
    }

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    async fn store() -> (Arc<ManualClock>, Arc<InMemoryUserStore>) {
        let clock = Arc::new(ManualClock::at_millis(1_700_000_000_000));
        let store = Arc::new(InMemoryUserStore::new(clock.clone()));
        let doc = UserDocument::new(user(), UserProfile::admin("admin@gmail.com"), clock.now());
        store.create(&doc).await.unwrap();
        (clock, store)
    }

    #[tokio::test]
    async fn drain_delivers_initial_and_later_snapshots_in_order() {
        let (clock, store) = store().await;
        let listener = RecordingListener::new();
        let mut bridge = SubscriptionBridge::open(store.as_ref(), store.clone(), &user())
            .await
            .unwrap()
            .with_listener(listener.clone());

        store
            .update(&user(), DocumentUpdate::pairing(PairingState::waiting(clock.now())))
            .await
            .unwrap();

        assert_eq!(bridge.drain().await, 2);
        let seen = listener.seen.lock().unwrap().clone();
        assert!(!seen[0].rfid_pairing.is_waiting());
        assert!(seen[1].rfid_pairing.is_waiting());
    }

    #[tokio::test]
    async fn failing_listener_does_not_block_others() {
        let (_, store) = store().await;
        let failing = RecordingListener::failing();
        let healthy = RecordingListener::new();
        let bridge = SubscriptionBridge::open(store.as_ref(), store.clone(), &user())
            .await
            .unwrap()
            .with_listener(failing.clone())
            .with_listener(healthy.clone());

        let doc = store.document(&user()).await.unwrap();
        let failures = bridge.dispatch(&doc).await;

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].listener, "RecordingListener");
        assert_eq!(healthy.count(), 1);
    }

    #[tokio::test]
    async fn check_now_rereads_document() {
        let (_, store) = store().await;
        let listener = RecordingListener::new();
        let bridge = SubscriptionBridge::open(store.as_ref(), store.clone(), &user())
            .await
            .unwrap()
            .with_listener(listener.clone());

        bridge.check_now().await.unwrap();

        assert_eq!(listener.count(), 1);
    }

    #[tokio::test]
    async fn open_on_unready_store_fails() {
        let (_, store) = store().await;
        store.set_ready(false);

        let result = SubscriptionBridge::open(store.as_ref(), store.clone(), &user()).await;

        assert!(matches!(result, Err(ServiceError::BackendUnavailable(_))));
    }

    #[tokio::test]
    async fn close_releases_subscription() {
        let (_, store) = store().await;
        let bridge = SubscriptionBridge::open(store.as_ref(), store.clone(), &user())
            .await
            .unwrap();
        assert_eq!(store.subscriber_count(&user()), 1);

        bridge.close();

        assert_eq!(store.subscriber_count(&user()), 0);
    }

    #[tokio::test]
    async fn stopping_spawned_bridge_releases_subscription() {
        let (_, store) = store().await;
        let handle = SubscriptionBridge::open(store.as_ref(), store.clone(), &user())
            .await
            .unwrap()
            .spawn();
        assert!(handle.is_running());

        handle.stop().await;

        assert_eq!(store.subscriber_count(&user()), 0);
    }
}
