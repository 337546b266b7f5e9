//! AppContext - the wiring built once at startup.
//!
//! Holds the ports, the admin rule and the two session controllers, and
//! hands out handlers that share them.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::foundation::{ServiceError, UserId};
use crate::domain::user::AdminPolicy;
use crate::ports::{
    Clock, DocumentSubscriber, IdentityProvider, MeasurementRepository, SessionNotifier,
    UserDocumentStore,
};

use super::handlers::{
    ClearMeasurementsHandler, DeleteMeasurementHandler, GetProfileHandler, GetUserDetailHandler,
    ListMeasurementsHandler, ListUsersHandler, RecordMeasurementsHandler, ResetPasswordHandler,
    SignInHandler, SignOutHandler, SignUpHandler, UpdateMeasurementHandler, UpdateProfileHandler,
};
use super::{BridgeHandle, PairingController, SubscriptionBridge, WeighingController};

/// Adapters the application runs against.
#[derive(Clone)]
pub struct Ports {
    pub store: Arc<dyn UserDocumentStore>,
    pub subscriber: Arc<dyn DocumentSubscriber>,
    pub measurements: Arc<dyn MeasurementRepository>,
    pub identity: Arc<dyn IdentityProvider>,
    pub notifier: Arc<dyn SessionNotifier>,
    pub clock: Arc<dyn Clock>,
}

pub struct AppContext {
    ports: Ports,
    admin_policy: AdminPolicy,
    pairing: Arc<PairingController>,
    weighing: Arc<WeighingController>,
}

impl AppContext {
    pub fn new(ports: Ports, config: &AppConfig) -> Self {
        let pairing = Arc::new(PairingController::new(
            ports.store.clone(),
            ports.notifier.clone(),
            ports.clock.clone(),
            config.sessions.pairing_policy(),
        ));
        let weighing = Arc::new(WeighingController::new(
            ports.store.clone(),
            ports.notifier.clone(),
            ports.clock.clone(),
            config.sessions.weighing_policy(),
        ));
        Self {
            admin_policy: AdminPolicy::new(config.backend.admin_email.clone()),
            ports,
            pairing,
            weighing,
        }
    }

    pub fn ports(&self) -> &Ports {
        &self.ports
    }

    pub fn admin_policy(&self) -> &AdminPolicy {
        &self.admin_policy
    }

    pub fn pairing(&self) -> &PairingController {
        &self.pairing
    }

    pub fn weighing(&self) -> &WeighingController {
        &self.weighing
    }

    /// Subscribes to the user's document with both controllers attached.
    pub async fn watch(&self, user_id: &UserId) -> Result<SubscriptionBridge, ServiceError> {
        let bridge =
            SubscriptionBridge::open(self.ports.subscriber.as_ref(), self.ports.store.clone(), user_id)
                .await?;
        Ok(bridge
            .with_listener(self.pairing.clone())
            .with_listener(self.weighing.clone()))
    }

    /// Like [`watch`](Self::watch), but runs the bridge in the background.
    pub async fn watch_in_background(&self, user_id: &UserId) -> Result<BridgeHandle, ServiceError> {
        Ok(self.watch(user_id).await?.spawn())
    }

    pub fn sign_in(&self) -> SignInHandler {
        SignInHandler::new(
            self.ports.identity.clone(),
            self.ports.store.clone(),
            self.admin_policy.clone(),
        )
    }

    pub fn sign_up(&self) -> SignUpHandler {
        SignUpHandler::new(
            self.ports.identity.clone(),
            self.ports.store.clone(),
            self.ports.clock.clone(),
            self.admin_policy.clone(),
        )
    }

    pub fn sign_out(&self) -> SignOutHandler {
        SignOutHandler::new(self.ports.identity.clone())
    }

    pub fn reset_password(&self) -> ResetPasswordHandler {
        ResetPasswordHandler::new(self.ports.identity.clone())
    }

    pub fn get_profile(&self) -> GetProfileHandler {
        GetProfileHandler::new(self.ports.store.clone(), self.ports.clock.clone())
    }

    pub fn update_profile(&self) -> UpdateProfileHandler {
        UpdateProfileHandler::new(self.ports.store.clone(), self.ports.clock.clone())
    }

    pub fn list_measurements(&self) -> ListMeasurementsHandler {
        ListMeasurementsHandler::new(self.ports.measurements.clone())
    }

    pub fn record_measurements(&self) -> RecordMeasurementsHandler {
        RecordMeasurementsHandler::new(self.ports.measurements.clone(), self.ports.clock.clone())
    }

    pub fn update_measurement(&self) -> UpdateMeasurementHandler {
        UpdateMeasurementHandler::new(self.ports.measurements.clone(), self.ports.clock.clone())
    }

    pub fn delete_measurement(&self) -> DeleteMeasurementHandler {
        DeleteMeasurementHandler::new(self.ports.measurements.clone())
    }

    pub fn clear_measurements(&self) -> ClearMeasurementsHandler {
        ClearMeasurementsHandler::new(self.ports.measurements.clone())
    }

    pub fn list_users(&self) -> ListUsersHandler {
        ListUsersHandler::new(self.ports.store.clone(), self.admin_policy.clone())
    }

    pub fn get_user_detail(&self) -> GetUserDetailHandler {
        GetUserDetailHandler::new(
            self.ports.store.clone(),
            self.ports.measurements.clone(),
            self.admin_policy.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        InMemoryIdentityProvider, InMemoryMeasurementRepository, InMemoryUserStore, ManualClock,
        RecordingNotifier,
    };
    use crate::config::{BackendConfig, Environment, LoggingConfig, SessionConfig};
    use crate::domain::pairing::PairingStatus;
    use secrecy::Secret;

    fn config(pairing_timeout_ms: u64) -> AppConfig {
        AppConfig {
            backend: BackendConfig {
                project_id: "timbang-test".to_string(),
                api_key: Secret::new("key".to_string()),
                admin_email: "boss@example.com".to_string(),
                environment: Environment::Development,
            },
            sessions: SessionConfig {
                pairing_timeout_ms,
                ..Default::default()
            },
            logging: LoggingConfig::default(),
        }
    }

    fn ports() -> (Ports, Arc<InMemoryUserStore>) {
        let clock = Arc::new(ManualClock::at_millis(1_700_000_000_000));
        let store = Arc::new(InMemoryUserStore::new(clock.clone()));
        let ports = Ports {
            store: store.clone(),
            subscriber: store.clone(),
            measurements: Arc::new(InMemoryMeasurementRepository::new()),
            identity: Arc::new(InMemoryIdentityProvider::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            clock,
        };
        (ports, store)
    }

    #[test]
    fn controllers_use_configured_timeouts() {
        let (ports, _) = ports();
        let ctx = AppContext::new(ports, &config(12_345));

        assert_eq!(ctx.pairing().policy().threshold_ms(), 12_345);
        assert_eq!(ctx.weighing().policy().threshold_ms(), 300_000);
    }

    #[test]
    fn admin_policy_uses_configured_email() {
        let (ports, _) = ports();
        let ctx = AppContext::new(ports, &config(60_000));

        assert!(ctx.admin_policy().is_admin_email("Boss@Example.com"));
        assert!(!ctx.admin_policy().is_admin_email("admin@gmail.com"));
    }

    #[tokio::test]
    async fn watch_attaches_both_controllers() {
        let (ports, store) = ports();
        let ctx = AppContext::new(ports, &config(60_000));
        let signed_up = ctx
            .sign_up()
            .handle(crate::application::SignUpCommand {
                email: "boss@example.com".to_string(),
                password: "secret123".to_string(),
                name: String::new(),
                birthdate: None,
                gender: None,
            })
            .await
            .unwrap();
        let user_id = signed_up.user.id;

        let mut bridge = ctx.watch(&user_id).await.unwrap();
        assert_eq!(store.subscriber_count(&user_id), 1);

        ctx.pairing().start(&user_id).await.unwrap();
        bridge.drain().await;

        let doc = store.document(&user_id).await.unwrap();
        assert_eq!(doc.rfid_pairing.status, PairingStatus::Waiting);

        bridge.close();
        assert_eq!(store.subscriber_count(&user_id), 0);
    }
}
