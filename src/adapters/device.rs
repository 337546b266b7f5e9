//! Simulated IoT devices.
//!
//! The real RFID reader and scale write straight into the user's document.
//! These simulators perform the same writes so the controllers can be
//! exercised end to end without hardware.

use std::sync::Arc;

use crate::domain::foundation::{ServiceError, UserId};
use crate::domain::measurement::MeasurementRecord;
use crate::domain::pairing::PairingState;
use crate::domain::user::UserDocument;
use crate::domain::weighing::{MeasurementResult, NutritionStatus};
use crate::ports::{Clock, DocumentUpdate, MeasurementRepository, UserDocumentStore};

async fn load(
    store: &dyn UserDocumentStore,
    user_id: &UserId,
) -> Result<UserDocument, ServiceError> {
    store
        .get(user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("User {} not found", user_id)))
}

/// Reader that reports a tapped card into a waiting pairing.
pub struct SimulatedRfidReader {
    store: Arc<dyn UserDocumentStore>,
}

impl SimulatedRfidReader {
    pub fn new(store: Arc<dyn UserDocumentStore>) -> Self {
        Self { store }
    }

    /// Writes `tag` as the pending tag of the user's pairing.
    ///
    /// Fails when no pairing is waiting, the way the reader firmware ignores
    /// taps outside a pairing window.
    pub async fn tap(&self, user_id: &UserId, tag: &str) -> Result<(), ServiceError> {
        let document = load(self.store.as_ref(), user_id).await?;
        if !document.rfid_pairing.is_waiting() {
            return Err(ServiceError::validation(
                "rfid_pairing",
                "no pairing is waiting for a card",
            ));
        }
        let state = PairingState {
            pending_tag: tag.to_string(),
            ..document.rfid_pairing
        };
        self.store
            .update(user_id, DocumentUpdate::pairing(state))
            .await?;
        tracing::debug!(user_id = %user_id, tag, "RFID card tapped");
        Ok(())
    }
}

/// Scale that measures a child once a weighing session is waiting.
pub struct SimulatedScale {
    store: Arc<dyn UserDocumentStore>,
    measurements: Arc<dyn MeasurementRepository>,
    clock: Arc<dyn Clock>,
}

impl SimulatedScale {
    pub fn new(
        store: Arc<dyn UserDocumentStore>,
        measurements: Arc<dyn MeasurementRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            measurements,
            clock,
        }
    }

    /// Card tapped on the scale: the session moves to measuring.
    pub async fn begin(&self, user_id: &UserId, tag: &str) -> Result<(), ServiceError> {
        let document = load(self.store.as_ref(), user_id).await?;
        let session = document
            .weighing_session
            .start_measuring(tag, self.clock.now())?;
        self.store
            .update(user_id, DocumentUpdate::weighing(session))
            .await?;
        tracing::debug!(user_id = %user_id, tag, "Scale started measuring");
        Ok(())
    }

    /// Readings are in: completes the session, stores `latestWeighing` and
    /// appends the history entry.
    pub async fn finish(
        &self,
        user_id: &UserId,
        weight: f64,
        height: f64,
        nutrition_status: NutritionStatus,
    ) -> Result<MeasurementResult, ServiceError> {
        let document = load(self.store.as_ref(), user_id).await?;
        let now = self.clock.now();
        let (session, result) =
            document
                .weighing_session
                .complete(weight, height, nutrition_status, now)?;

        self.measurements
            .append(user_id, &MeasurementRecord::from_result(&result, now))
            .await?;
        self.store
            .update(
                user_id,
                DocumentUpdate::weighing(session).with_latest_weighing(result.clone()),
            )
            .await?;
        tracing::debug!(
            user_id = %user_id,
            weight,
            height,
            status = %nutrition_status,
            "Scale completed measurement"
        );
        Ok(result)
    }

    /// `begin` followed by `finish`.
    pub async fn weigh(
        &self,
        user_id: &UserId,
        tag: &str,
        weight: f64,
        height: f64,
        nutrition_status: NutritionStatus,
    ) -> Result<MeasurementResult, ServiceError> {
        self.begin(user_id, tag).await?;
        self.finish(user_id, weight, height, nutrition_status).await
    }
}
