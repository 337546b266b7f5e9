//! In-memory user document store with live subscriptions.
//!
//! Stands in for the hosted document database in tests and the simulator.
//! Every committed write is pushed to the user's subscribers while the
//! write lock is still held, so snapshots arrive in commit order.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, RwLock};

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::user::UserDocument;
use crate::ports::{Clock, DocumentSubscriber, DocumentUpdate, Subscription, UserDocumentStore};

type SubscriberMap = HashMap<UserId, Vec<(u64, mpsc::UnboundedSender<UserDocument>)>>;

/// In-memory implementation of [`UserDocumentStore`] and [`DocumentSubscriber`].
///
/// Failure injection (`set_ready`, `fail_writes`, `fail_reads`) lets tests
/// exercise the error paths of the controllers.
pub struct InMemoryUserStore {
    documents: RwLock<HashMap<UserId, UserDocument>>,
    subscribers: Arc<Mutex<SubscriberMap>>,
    next_subscriber: AtomicU64,
    clock: Arc<dyn Clock>,
    ready: AtomicBool,
    write_failure: Mutex<Option<String>>,
    read_failure: Mutex<Option<String>>,
    write_calls: AtomicUsize,
}

impl InMemoryUserStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            next_subscriber: AtomicU64::new(1),
            clock,
            ready: AtomicBool::new(true),
            write_failure: Mutex::new(None),
            read_failure: Mutex::new(None),
            write_calls: AtomicUsize::new(0),
        }
    }

    // === Test Helpers ===

    /// Marks the backend as (un)initialized.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Makes every following write fail with `message`.
    pub fn fail_writes(&self, message: impl Into<String>) {
        *lock(&self.write_failure) = Some(message.into());
    }

    /// Makes every following read fail with `message`.
    pub fn fail_reads(&self, message: impl Into<String>) {
        *lock(&self.read_failure) = Some(message.into());
    }

    pub fn clear_failures(&self) {
        *lock(&self.write_failure) = None;
        *lock(&self.read_failure) = None;
    }

    /// Number of `create`/`update` calls received, including failed ones.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Live subscriptions for a user.
    pub fn subscriber_count(&self, user_id: &UserId) -> usize {
        lock(&self.subscribers)
            .get(user_id)
            .map(|senders| senders.iter().filter(|(_, tx)| !tx.is_closed()).count())
            .unwrap_or(0)
    }

    /// Current document, bypassing failure injection.
    pub async fn document(&self, user_id: &UserId) -> Option<UserDocument> {
        self.documents.read().await.get(user_id).cloned()
    }

    // === Internals ===

    fn ensure_ready(&self) -> Result<(), DomainError> {
        if self.ready.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::BackendUnavailable,
                "Document store is not initialized",
            ))
        }
    }

    fn begin_write(&self) -> Result<(), DomainError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_ready()?;
        match lock(&self.write_failure).clone() {
            Some(message) => Err(DomainError::new(ErrorCode::WriteRejected, message)),
            None => Ok(()),
        }
    }

    fn begin_read(&self) -> Result<(), DomainError> {
        self.ensure_ready()?;
        match lock(&self.read_failure).clone() {
            Some(message) => Err(DomainError::new(ErrorCode::ReadFailed, message)),
            None => Ok(()),
        }
    }

    fn publish(&self, document: &UserDocument) {
        let mut subscribers = lock(&self.subscribers);
        if let Some(senders) = subscribers.get_mut(&document.id) {
            senders.retain(|(_, tx)| tx.send(document.clone()).is_ok());
            tracing::debug!(
                user_id = %document.id,
                subscribers = senders.len(),
                "Published document snapshot"
            );
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl UserDocumentStore for InMemoryUserStore {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<UserDocument>, DomainError> {
        self.begin_read()?;
        Ok(self.documents.read().await.get(user_id).cloned())
    }

    async fn create(&self, document: &UserDocument) -> Result<(), DomainError> {
        self.begin_write()?;
        let mut documents = self.documents.write().await;
        documents.insert(document.id.clone(), document.clone());
        self.publish(document);
        Ok(())
    }

    async fn update(&self, user_id: &UserId, update: DocumentUpdate) -> Result<(), DomainError> {
        self.begin_write()?;
        let mut documents = self.documents.write().await;
        let document = documents.get_mut(user_id).ok_or_else(|| {
            DomainError::new(ErrorCode::UserNotFound, format!("User {} not found", user_id))
        })?;
        update.apply_to(document, self.clock.now());
        let committed = document.clone();
        self.publish(&committed);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<UserDocument>, DomainError> {
        self.begin_read()?;
        let mut documents: Vec<UserDocument> =
            self.documents.read().await.values().cloned().collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }
}

#[async_trait]
impl DocumentSubscriber for InMemoryUserStore {
    async fn subscribe(&self, user_id: &UserId) -> Result<Subscription, DomainError> {
        self.ensure_ready()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_subscriber.fetch_add(1, Ordering::SeqCst);

        // Hold the read lock so no write slips between the initial snapshot
        // and registration.
        let documents = self.documents.read().await;
        if let Some(current) = documents.get(user_id) {
            // Receiver is alive, cannot fail.
            let _ = tx.send(current.clone());
        }
        lock(&self.subscribers)
            .entry(user_id.clone())
            .or_default()
            .push((id, tx));
        drop(documents);

        let registry = Arc::clone(&self.subscribers);
        let owner = user_id.clone();
        Ok(Subscription::new(user_id.clone(), rx, move || {
            let mut subscribers = lock(&registry);
            if let Some(senders) = subscribers.get_mut(&owner) {
                senders.retain(|(sender_id, _)| *sender_id != id);
                if senders.is_empty() {
                    subscribers.remove(&owner);
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ManualClock;
    use crate::domain::foundation::Timestamp;
    use crate::domain::pairing::{PairingState, PairingStatus};
    use crate::domain::user::UserProfile;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    fn store() -> (Arc<ManualClock>, InMemoryUserStore) {
        let clock = Arc::new(ManualClock::at_millis(1_000));
        let store = InMemoryUserStore::new(clock.clone());
        (clock, store)
    }

    async fn seeded() -> (Arc<ManualClock>, InMemoryUserStore) {
        let (clock, store) = store();
        let doc = UserDocument::new(user(), UserProfile::admin("admin@gmail.com"), clock.now());
        store.create(&doc).await.unwrap();
        (clock, store)
    }

    #[tokio::test]
    async fn update_merges_and_stamps() {
        let (clock, store) = seeded().await;
        clock.advance_millis(500);

        store
            .update(&user(), DocumentUpdate::pairing(PairingState::waiting(clock.now())))
            .await
            .unwrap();

        let doc = store.get(&user()).await.unwrap().unwrap();
        assert_eq!(doc.rfid_pairing.status, PairingStatus::Waiting);
        assert_eq!(doc.updated_at, Timestamp::from_unix_millis(1_500));
        assert_eq!(store.write_calls(), 2);
    }

    #[tokio::test]
    async fn update_of_missing_user_is_not_found() {
        let (_, store) = store();
        let err = store
            .update(&user(), DocumentUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn subscriber_gets_current_document_then_changes() {
        let (clock, store) = seeded().await;
        let mut sub = store.subscribe(&user()).await.unwrap();

        store
            .update(&user(), DocumentUpdate::pairing(PairingState::waiting(clock.now())))
            .await
            .unwrap();

        let first = sub.next().await.unwrap();
        let second = sub.next().await.unwrap();
        assert_eq!(first.rfid_pairing.status, PairingStatus::Idle);
        assert_eq!(second.rfid_pairing.status, PairingStatus::Waiting);
    }

    #[tokio::test]
    async fn dropping_subscription_unregisters() {
        let (_, store) = seeded().await;
        let sub = store.subscribe(&user()).await.unwrap();
        assert_eq!(store.subscriber_count(&user()), 1);

        sub.unsubscribe();

        assert_eq!(store.subscriber_count(&user()), 0);
    }

    #[tokio::test]
    async fn unready_store_rejects_everything() {
        let (_, store) = seeded().await;
        store.set_ready(false);

        assert_eq!(
            store.get(&user()).await.unwrap_err().code,
            ErrorCode::BackendUnavailable
        );
        assert_eq!(
            store.subscribe(&user()).await.unwrap_err().code,
            ErrorCode::BackendUnavailable
        );
        assert!(!UserDocumentStore::is_ready(&store));
    }

    #[tokio::test]
    async fn injected_write_failure_passes_message() {
        let (_, store) = seeded().await;
        store.fail_writes("PERMISSION_DENIED");

        let err = store
            .update(&user(), DocumentUpdate::default())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::WriteRejected);
        assert_eq!(err.message, "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (clock, store) = seeded().await;
        clock.advance_millis(10);
        let other = UserDocument::new(
            UserId::new("u2").unwrap(),
            UserProfile::admin("admin@gmail.com"),
            clock.now(),
        );
        store.create(&other).await.unwrap();

        let ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id.to_string())
            .collect();
        assert_eq!(ids, vec!["u2", "u1"]);
    }
}
