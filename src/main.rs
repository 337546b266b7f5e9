//! Timbang simulator
//!
//! Runs the pairing and weighing workflows end to end against in-memory
//! adapters, with a simulated RFID reader and scale playing the device
//! side. Configuration comes from `TIMBANG__*` environment variables.

use std::error::Error;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::try_join_all;
use tracing::info;

use timbang::adapters::{
    InMemoryIdentityProvider, InMemoryMeasurementRepository, InMemoryUserStore,
    SimulatedRfidReader, SimulatedScale, SystemClock, TracingNotifier,
};
use timbang::application::{AppContext, Ports, SignUpCommand};
use timbang::config::AppConfig;
use timbang::domain::foundation::ServiceError;
use timbang::domain::user::Gender;
use timbang::domain::weighing::{ChildResponse, EatingPattern, NutritionStatus, Selection};
use timbang::logging;
use timbang::ports::{SortOrder, UserDocumentStore};

/// One simulated household.
struct Family {
    email: &'static str,
    child: &'static str,
    birthdate: Option<NaiveDate>,
    gender: Gender,
    tag: &'static str,
    selection: Selection,
    weight: f64,
    height: f64,
    status: NutritionStatus,
}

struct Devices {
    reader: SimulatedRfidReader,
    scale: SimulatedScale,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    logging::init(&config.logging);

    info!(
        project_id = %config.backend.project_id,
        pairing_timeout_ms = config.sessions.pairing_timeout_ms,
        weighing_timeout_ms = config.sessions.weighing_timeout_ms,
        "Starting Timbang simulator"
    );

    let clock = Arc::new(SystemClock);
    let store = Arc::new(InMemoryUserStore::new(clock.clone()));
    let measurements = Arc::new(InMemoryMeasurementRepository::new());
    let ports = Ports {
        store: store.clone(),
        subscriber: store.clone(),
        measurements: measurements.clone(),
        identity: Arc::new(InMemoryIdentityProvider::new()),
        notifier: Arc::new(TracingNotifier),
        clock: clock.clone(),
    };
    let ctx = AppContext::new(ports, &config);
    let devices = Devices {
        reader: SimulatedRfidReader::new(store.clone()),
        scale: SimulatedScale::new(store, measurements, clock),
    };

    let families = [
        Family {
            email: "siti@example.com",
            child: "Ayu",
            birthdate: NaiveDate::from_ymd_opt(2021, 3, 15),
            gender: Gender::Female,
            tag: "04A1B2C3",
            selection: Selection::new(EatingPattern::Cukup, ChildResponse::Aktif),
            weight: 20.5,
            height: 110.0,
            status: NutritionStatus::Sehat,
        },
        Family {
            email: "budi@example.com",
            child: "Raka",
            birthdate: NaiveDate::from_ymd_opt(2020, 11, 2),
            gender: Gender::Male,
            tag: "04D4E5F6",
            selection: Selection::new(EatingPattern::Berlebih, ChildResponse::Pasif),
            weight: 24.8,
            height: 104.0,
            status: NutritionStatus::Obesitas,
        },
    ];

    try_join_all(families.iter().map(|family| simulate(&ctx, &devices, family))).await?;

    info!("Simulation finished");
    Ok(())
}

async fn simulate(ctx: &AppContext, devices: &Devices, family: &Family) -> Result<(), Box<dyn Error>> {
    let signed_up = ctx
        .sign_up()
        .handle(SignUpCommand {
            email: family.email.to_string(),
            password: "rahasia123".to_string(),
            name: family.child.to_string(),
            birthdate: family.birthdate,
            gender: Some(family.gender),
        })
        .await?;
    let user_id = signed_up.user.id;
    let profile = ctx.get_profile().handle(&user_id).await?;
    info!(user_id = %user_id, child = %profile.name, age = %profile.age(), "Registered");

    let mut bridge = ctx.watch(&user_id).await?;

    // Pairing: the parent opens the window, the child taps the card.
    ctx.pairing().start(&user_id).await?;
    bridge.drain().await;
    devices.reader.tap(&user_id, family.tag).await?;
    bridge.drain().await;

    // Weighing: selections first, then the scale does its part.
    ctx.weighing().start(&user_id, family.selection).await?;
    bridge.drain().await;
    devices
        .scale
        .weigh(&user_id, family.tag, family.weight, family.height, family.status)
        .await?;
    bridge.drain().await;

    let history = ctx
        .list_measurements()
        .handle(&user_id, SortOrder::NewestFirst)
        .await?;
    let document = ctx
        .ports()
        .store
        .get(&user_id)
        .await
        .map_err(ServiceError::from)?;
    info!(
        user_id = %user_id,
        rfid = ?document.as_ref().and_then(|d| d.rfid.clone()),
        entries = history.len(),
        "Household done"
    );

    bridge.close();
    Ok(())
}
