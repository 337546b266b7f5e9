//! PairingController - links an RFID card to a user profile.
//!
//! `start` opens a pairing window in the user's document. The RFID reader
//! writes the scanned tag into the same document, and each snapshot the
//! subscription bridge delivers is run through `on_snapshot`, which either
//! completes the pairing, times it out, or leaves it alone.
//!
//! The decision is taken from the delivered snapshot, so a redelivered
//! snapshot would repeat it. The controller remembers the last window it
//! settled per user (keyed by the window's start time) and ignores repeats.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::foundation::{ServiceError, TimeoutPolicy, Timestamp, UserId};
use crate::domain::pairing::{PairingDecision, PairingState};
use crate::domain::user::UserDocument;
use crate::ports::{
    Clock, DocumentUpdate, SessionNotice, SessionNotifier, SnapshotListener, UserDocumentStore,
};

/// What a snapshot did to the pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingOutcome {
    /// Tag persisted to the profile, pairing back to idle.
    Completed { tag: String },
    /// Waited too long, pairing back to idle.
    TimedOut,
    Unchanged,
}

/// How a pairing window was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Settled {
    Completed {
        started: Option<Timestamp>,
        tag: String,
    },
    Expired {
        started: Option<Timestamp>,
    },
}

/// Drives the RFID pairing sub-document.
pub struct PairingController {
    store: Arc<dyn UserDocumentStore>,
    notifier: Arc<dyn SessionNotifier>,
    clock: Arc<dyn Clock>,
    policy: TimeoutPolicy,
    settled: Mutex<HashMap<UserId, Settled>>,
}

impl PairingController {
    pub fn new(
        store: Arc<dyn UserDocumentStore>,
        notifier: Arc<dyn SessionNotifier>,
        clock: Arc<dyn Clock>,
        policy: TimeoutPolicy,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            policy,
            settled: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> TimeoutPolicy {
        self.policy
    }

    /// Opens a pairing window. A pairing already waiting is restarted.
    pub async fn start(&self, user_id: &UserId) -> Result<PairingState, ServiceError> {
        self.ensure_ready()?;
        let state = PairingState::waiting(self.clock.now());
        self.store
            .update(user_id, DocumentUpdate::pairing(state.clone()))
            .await?;
        tracing::info!(user_id = %user_id, "RFID pairing started");
        Ok(state)
    }

    /// Returns the pairing to idle. Safe to call in any state.
    pub async fn cancel(&self, user_id: &UserId) -> Result<(), ServiceError> {
        self.ensure_ready()?;
        self.store
            .update(user_id, DocumentUpdate::pairing(PairingState::idle()))
            .await?;
        self.lock_settled().remove(user_id);
        tracing::info!(user_id = %user_id, "RFID pairing cancelled");
        Ok(())
    }

    /// Reacts to a document snapshot.
    ///
    /// A scanned tag is checked before expiry, so a pairing that succeeded
    /// late is never reported as timed out.
    pub async fn on_snapshot(&self, snapshot: &UserDocument) -> Result<PairingOutcome, ServiceError> {
        let user_id = &snapshot.id;
        let started = snapshot.rfid_pairing.pairing_timestamp;
        match snapshot.rfid_pairing.evaluate(&self.policy, &self.clock.now()) {
            PairingDecision::Complete { tag } => {
                let settled = Settled::Completed {
                    started,
                    tag: tag.clone(),
                };
                if !self.claim(user_id, settled) {
                    tracing::debug!(user_id = %user_id, "Ignoring replayed pairing completion");
                    return Ok(PairingOutcome::Unchanged);
                }
                let update = DocumentUpdate::pairing(PairingState::idle()).with_rfid(tag.clone());
                self.settle(user_id, update).await?;
                tracing::info!(user_id = %user_id, tag = %tag, "RFID pairing completed");
                self.notifier.notify(SessionNotice::PairingCompleted {
                    user_id: user_id.clone(),
                    tag: tag.clone(),
                });
                Ok(PairingOutcome::Completed { tag })
            }
            PairingDecision::Expire => {
                if !self.claim(user_id, Settled::Expired { started }) {
                    tracing::debug!(user_id = %user_id, "Ignoring replayed pairing expiry");
                    return Ok(PairingOutcome::Unchanged);
                }
                self.settle(user_id, DocumentUpdate::pairing(PairingState::idle()))
                    .await?;
                tracing::info!(
                    user_id = %user_id,
                    threshold_ms = self.policy.threshold_ms(),
                    "RFID pairing timed out"
                );
                self.notifier.notify(SessionNotice::PairingTimedOut {
                    user_id: user_id.clone(),
                });
                Ok(PairingOutcome::TimedOut)
            }
            PairingDecision::Unchanged => Ok(PairingOutcome::Unchanged),
        }
    }

    /// Records `settled` for the user unless it was already recorded.
    fn claim(&self, user_id: &UserId, settled: Settled) -> bool {
        let mut map = self.lock_settled();
        if map.get(user_id) == Some(&settled) {
            return false;
        }
        map.insert(user_id.clone(), settled);
        true
    }

    /// Writes the settling update; a failure forgets the claim so the next
    /// delivery retries.
    async fn settle(&self, user_id: &UserId, update: DocumentUpdate) -> Result<(), ServiceError> {
        let written = match self.ensure_ready() {
            Ok(()) => self.store.update(user_id, update).await.map_err(ServiceError::from),
            Err(err) => Err(err),
        };
        if written.is_err() {
            self.lock_settled().remove(user_id);
        }
        written
    }

    fn lock_settled(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, Settled>> {
        self.settled.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_ready(&self) -> Result<(), ServiceError> {
        if self.store.is_ready() {
            Ok(())
        } else {
            Err(ServiceError::backend_unavailable(
                "Document store is not initialized",
            ))
        }
    }
}

#[async_trait]
impl SnapshotListener for PairingController {
    async fn on_snapshot(&self, snapshot: &UserDocument) -> Result<(), ServiceError> {
        PairingController::on_snapshot(self, snapshot).await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "PairingController"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
    use crate::domain::pairing::PairingStatus;
    use crate::domain::user::UserProfile;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    const T0: i64 = 1_700_000_000_000;

    struct FixedClock(Mutex<Timestamp>);

    impl FixedClock {
        fn at(millis: i64) -> Self {
            Self(Mutex::new(Timestamp::from_unix_millis(millis)))
        }

        fn set(&self, millis: i64) {
            *self.0.lock().unwrap() = Timestamp::from_unix_millis(millis);
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> Timestamp {
            *self.0.lock().unwrap()
        }
    }

    struct MockStore {
        updates: Mutex<Vec<DocumentUpdate>>,
        ready: AtomicBool,
        fail_with: Option<String>,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                updates: Mutex::new(Vec::new()),
                ready: AtomicBool::new(true),
                fail_with: None,
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                ..Self::new()
            }
        }

        fn updates(&self) -> Vec<DocumentUpdate> {
            self.updates.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UserDocumentStore for MockStore {
        fn is_ready(&self) -> bool {
            self.ready.load(Ordering::SeqCst)
        }

        async fn get(&self, _user_id: &UserId) -> Result<Option<UserDocument>, DomainError> {
            Ok(None)
        }

        async fn create(&self, _document: &UserDocument) -> Result<(), DomainError> {
            Ok(())
        }

        async fn update(&self, _user_id: &UserId, update: DocumentUpdate) -> Result<(), DomainError> {
            if let Some(message) = &self.fail_with {
                return Err(DomainError::new(ErrorCode::WriteRejected, message.clone()));
            }
            self.updates.lock().unwrap().push(update);
            Ok(())
        }

        async fn list(&self) -> Result<Vec<UserDocument>, DomainError> {
            Ok(vec![])
        }
    }

    #[derive(Default)]
    struct MockNotifier {
        notices: Mutex<Vec<SessionNotice>>,
    }

    impl SessionNotifier for MockNotifier {
        fn notify(&self, notice: SessionNotice) {
            self.notices.lock().unwrap().push(notice);
        }
    }

    struct Fixture {
        store: Arc<MockStore>,
        notifier: Arc<MockNotifier>,
        clock: Arc<FixedClock>,
        controller: PairingController,
    }

    fn fixture_with(store: MockStore) -> Fixture {
        let store = Arc::new(store);
        let notifier = Arc::new(MockNotifier::default());
        let clock = Arc::new(FixedClock::at(T0));
        let controller = PairingController::new(
            store.clone(),
            notifier.clone(),
            clock.clone(),
            TimeoutPolicy::pairing(),
        );
        Fixture {
            store,
            notifier,
            clock,
            controller,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MockStore::new())
    }

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    fn snapshot(pairing: PairingState) -> UserDocument {
        let mut doc = UserDocument::new(
            user(),
            UserProfile::admin("admin@gmail.com"),
            Timestamp::from_unix_millis(T0),
        );
        doc.rfid_pairing = pairing;
        doc
    }

    #[tokio::test]
    async fn start_writes_waiting_with_now() {
        let f = fixture();

        let state = f.controller.start(&user()).await.unwrap();

        assert_eq!(state.status, PairingStatus::Waiting);
        assert_eq!(state.pairing_timestamp, Some(Timestamp::from_unix_millis(T0)));
        assert_eq!(f.store.updates(), vec![DocumentUpdate::pairing(state)]);
    }

    #[tokio::test]
    async fn start_on_unready_store_writes_nothing() {
        let f = fixture();
        f.store.ready.store(false, Ordering::SeqCst);

        let err = f.controller.start(&user()).await.unwrap_err();

        assert!(matches!(err, ServiceError::BackendUnavailable(_)));
        assert!(f.store.updates().is_empty());
    }

    #[tokio::test]
    async fn rejected_write_message_passes_through() {
        let f = fixture_with(MockStore::failing("PERMISSION_DENIED: missing rules"));

        let err = f.controller.start(&user()).await.unwrap_err();

        assert_eq!(
            err,
            ServiceError::WriteFailed("PERMISSION_DENIED: missing rules".to_string())
        );
    }

    #[tokio::test]
    async fn cancel_writes_idle() {
        let f = fixture();

        f.controller.cancel(&user()).await.unwrap();
        f.controller.cancel(&user()).await.unwrap();

        let updates = f.store.updates();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].rfid_pairing, Some(PairingState::idle()));
    }

    #[tokio::test]
    async fn scanned_tag_completes_pairing() {
        let f = fixture();
        let mut pairing = PairingState::waiting(Timestamp::from_unix_millis(T0));
        pairing.pending_tag = "04:A3:2F:19".to_string();

        let outcome = f.controller.on_snapshot(&snapshot(pairing)).await.unwrap();

        assert_eq!(
            outcome,
            PairingOutcome::Completed {
                tag: "04:A3:2F:19".to_string()
            }
        );
        let updates = f.store.updates();
        assert_eq!(updates[0].rfid.as_deref(), Some("04:A3:2F:19"));
        assert_eq!(updates[0].rfid_pairing, Some(PairingState::idle()));
        assert!(matches!(
            f.notifier.notices.lock().unwrap()[0],
            SessionNotice::PairingCompleted { .. }
        ));
    }

    #[tokio::test]
    async fn completion_wins_over_expiry() {
        let f = fixture();
        let mut pairing = PairingState::waiting(Timestamp::from_unix_millis(T0));
        pairing.pending_tag = "04:A3".to_string();
        f.clock.set(T0 + 600_000);

        let outcome = f.controller.on_snapshot(&snapshot(pairing)).await.unwrap();

        assert!(matches!(outcome, PairingOutcome::Completed { .. }));
        assert_eq!(f.notifier.notices.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn expired_waiting_times_out() {
        let f = fixture();
        f.clock.set(T0 + 61_000);

        let outcome = f
            .controller
            .on_snapshot(&snapshot(PairingState::waiting(Timestamp::from_unix_millis(T0))))
            .await
            .unwrap();

        assert_eq!(outcome, PairingOutcome::TimedOut);
        assert_eq!(f.store.updates()[0].rfid_pairing, Some(PairingState::idle()));
        assert!(f.store.updates()[0].rfid.is_none());
        assert!(matches!(
            f.notifier.notices.lock().unwrap()[0],
            SessionNotice::PairingTimedOut { .. }
        ));
    }

    #[tokio::test]
    async fn fresh_waiting_is_left_alone() {
        let f = fixture();
        f.clock.set(T0 + 59_000);

        let outcome = f
            .controller
            .on_snapshot(&snapshot(PairingState::waiting(Timestamp::from_unix_millis(T0))))
            .await
            .unwrap();

        assert_eq!(outcome, PairingOutcome::Unchanged);
        assert!(f.store.updates().is_empty());
        assert!(f.notifier.notices.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_completion_write_sends_no_notice() {
        let f = fixture_with(MockStore::failing("UNAVAILABLE"));
        let mut pairing = PairingState::waiting(Timestamp::from_unix_millis(T0));
        pairing.pending_tag = "04:A3".to_string();

        let err = f.controller.on_snapshot(&snapshot(pairing)).await.unwrap_err();

        assert_eq!(err, ServiceError::WriteFailed("UNAVAILABLE".to_string()));
        assert!(f.notifier.notices.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn replayed_completion_is_handled_once() {
        let f = fixture();
        let mut pairing = PairingState::waiting(Timestamp::from_unix_millis(T0));
        pairing.pending_tag = "04:A3".to_string();
        let doc = snapshot(pairing);

        f.controller.on_snapshot(&doc).await.unwrap();
        let replay = f.controller.on_snapshot(&doc).await.unwrap();

        assert_eq!(replay, PairingOutcome::Unchanged);
        assert_eq!(f.store.updates().len(), 1);
        assert_eq!(f.notifier.notices.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn replayed_expiry_is_handled_once() {
        let f = fixture();
        f.clock.set(T0 + 61_000);
        let doc = snapshot(PairingState::waiting(Timestamp::from_unix_millis(T0)));

        f.controller.on_snapshot(&doc).await.unwrap();
        let replay = f.controller.on_snapshot(&doc).await.unwrap();

        assert_eq!(replay, PairingOutcome::Unchanged);
        assert_eq!(f.store.updates().len(), 1);
        assert_eq!(f.notifier.notices.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn new_window_with_same_card_completes_again() {
        let f = fixture();
        let mut first = PairingState::waiting(Timestamp::from_unix_millis(T0));
        first.pending_tag = "04:A3".to_string();
        let mut second = PairingState::waiting(Timestamp::from_unix_millis(T0 + 120_000));
        second.pending_tag = "04:A3".to_string();
        f.clock.set(T0 + 125_000);

        f.controller.on_snapshot(&snapshot(first)).await.unwrap();
        let outcome = f.controller.on_snapshot(&snapshot(second)).await.unwrap();

        assert!(matches!(outcome, PairingOutcome::Completed { .. }));
        assert_eq!(f.notifier.notices.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_completion_is_retried_on_next_delivery() {
        let f = fixture_with(MockStore::failing("UNAVAILABLE"));
        let mut pairing = PairingState::waiting(Timestamp::from_unix_millis(T0));
        pairing.pending_tag = "04:A3".to_string();
        let doc = snapshot(pairing);

        f.controller.on_snapshot(&doc).await.unwrap_err();
        let err = f.controller.on_snapshot(&doc).await.unwrap_err();

        assert_eq!(err, ServiceError::WriteFailed("UNAVAILABLE".to_string()));
        assert!(f.controller.lock_settled().is_empty());
    }

    #[tokio::test]
    async fn cancel_forgets_settled_window() {
        let f = fixture();
        let mut pairing = PairingState::waiting(Timestamp::from_unix_millis(T0));
        pairing.pending_tag = "04:A3".to_string();
        f.controller.on_snapshot(&snapshot(pairing)).await.unwrap();

        f.controller.cancel(&user()).await.unwrap();

        assert!(f.controller.lock_settled().is_empty());
    }
}
