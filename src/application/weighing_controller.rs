//! WeighingController - the weigh-in workflow.
//!
//! `start` records the parent's selections and opens a session. The scale
//! writes `measuring` and then `completed` with a result into the same
//! document. On a completed snapshot the controller shows the result and
//! writes the session back to idle; that reset is the acknowledgment the
//! store itself has no notion of.
//!
//! The history entry is the scale's write, not ours, so a replayed
//! completed snapshot can never duplicate it. Replays are still detected
//! (by the result's `dateTime`) so the user sees each result once and the
//! reset is written once.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::foundation::{
    DomainError, ErrorCode, ServiceError, TimeoutPolicy, Timestamp, UserId,
};
use crate::domain::user::UserDocument;
use crate::domain::weighing::{MeasurementResult, Selection, WeighingDecision, WeighingSession};
use crate::ports::{
    Clock, DocumentUpdate, SessionNotice, SessionNotifier, SnapshotListener, UserDocumentStore,
};

/// What a snapshot did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum WeighingOutcome {
    /// Result shown and session reset to idle.
    ResultShown(MeasurementResult),
    /// Waited too long, session reset to idle.
    TimedOut,
    Unchanged,
}

/// Acknowledgment progress of one completed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ack {
    /// Shown; reset write in flight.
    Resetting,
    /// Shown; reset write failed and may be retried.
    ResetFailed,
    Done,
}

/// Drives the weighing session sub-document.
pub struct WeighingController {
    store: Arc<dyn UserDocumentStore>,
    notifier: Arc<dyn SessionNotifier>,
    clock: Arc<dyn Clock>,
    policy: TimeoutPolicy,
    acknowledged: Mutex<HashMap<UserId, (Timestamp, Ack)>>,
}

impl WeighingController {
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
            acknowledged: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> TimeoutPolicy {
        self.policy
    }

    /// Opens a session with the parent's selections.
    ///
    /// Both selections are required; a missing one fails before anything
    /// is written.
    pub async fn start(
        &self,
        user_id: &UserId,
        selection: Selection,
    ) -> Result<WeighingSession, ServiceError> {
        let selection = selection.validate()?;
        self.ensure_ready()?;
        let session = WeighingSession::waiting(selection, self.clock.now());
        self.store
            .update(user_id, DocumentUpdate::weighing(session.clone()))
            .await?;
        tracing::info!(
            user_id = %user_id,
            eating_pattern = %selection.eating_pattern,
            child_response = %selection.child_response,
            "Weighing session started"
        );
        Ok(session)
    }

    /// Returns the session to idle, clearing selections and result.
    pub async fn cancel(&self, user_id: &UserId) -> Result<(), ServiceError> {
        self.ensure_ready()?;
        self.store
            .update(user_id, DocumentUpdate::weighing(WeighingSession::idle()))
            .await?;
        self.lock_acks().remove(user_id);
        tracing::info!(user_id = %user_id, "Weighing session cancelled");
        Ok(())
    }

    /// Last persisted result, independent of the live session.
    pub async fn fetch_latest(&self, user_id: &UserId) -> Result<MeasurementResult, ServiceError> {
        self.ensure_ready()?;
        let document = self
            .store
            .get(user_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::UserNotFound, format!("User {} not found", user_id))
            })?;
        document.latest_weighing.ok_or_else(|| {
            DomainError::new(ErrorCode::WeighingResultNotFound, "No weighing result found").into()
        })
    }

    /// Reacts to a document snapshot.
    pub async fn on_snapshot(&self, snapshot: &UserDocument) -> Result<WeighingOutcome, ServiceError> {
        let user_id = &snapshot.id;
        match snapshot
            .weighing_session
            .evaluate(&self.policy, &self.clock.now())
        {
            WeighingDecision::ShowResult(result) => self.acknowledge(user_id, result).await,
            WeighingDecision::Expire => {
                self.ensure_ready()?;
                self.reset(user_id).await?;
                tracing::info!(
                    user_id = %user_id,
                    threshold_ms = self.policy.threshold_ms(),
                    "Weighing session timed out"
                );
                self.notifier.notify(SessionNotice::WeighingTimedOut {
                    user_id: user_id.clone(),
                });
                Ok(WeighingOutcome::TimedOut)
            }
            WeighingDecision::Unchanged => Ok(WeighingOutcome::Unchanged),
        }
    }

    async fn acknowledge(
        &self,
        user_id: &UserId,
        result: MeasurementResult,
    ) -> Result<WeighingOutcome, ServiceError> {
        let notify = {
            let mut acknowledged = self.lock_acks();
            match acknowledged.get(user_id).copied() {
                Some((seen, Ack::Resetting | Ack::Done)) if seen == result.date_time => {
                    tracing::debug!(user_id = %user_id, "Ignoring replayed weighing result");
                    return Ok(WeighingOutcome::Unchanged);
                }
                Some((seen, Ack::ResetFailed)) if seen == result.date_time => {
                    acknowledged.insert(user_id.clone(), (result.date_time, Ack::Resetting));
                    false
                }
                _ => {
                    acknowledged.insert(user_id.clone(), (result.date_time, Ack::Resetting));
                    true
                }
            }
        };

        if notify {
            tracing::info!(
                user_id = %user_id,
                weight = result.weight,
                height = result.height,
                nutrition_status = %result.nutrition_status,
                "Weighing result received"
            );
            self.notifier.notify(SessionNotice::WeighingResult {
                user_id: user_id.clone(),
                result: result.clone(),
            });
        }

        let reset = async {
            self.ensure_ready()?;
            self.reset(user_id).await
        }
        .await;
        let state = if reset.is_ok() { Ack::Done } else { Ack::ResetFailed };
        self.lock_acks()
            .insert(user_id.clone(), (result.date_time, state));
        reset?;

        Ok(WeighingOutcome::ResultShown(result))
    }

    async fn reset(&self, user_id: &UserId) -> Result<(), ServiceError> {
        self.store
            .update(user_id, DocumentUpdate::weighing(WeighingSession::idle()))
            .await?;
        Ok(())
    }

    fn lock_acks(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, (Timestamp, Ack)>> {
        self.acknowledged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
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
impl SnapshotListener for WeighingController {
    async fn on_snapshot(&self, snapshot: &UserDocument) -> Result<(), ServiceError> {
        WeighingController::on_snapshot(self, snapshot).await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "WeighingController"
    }
}
