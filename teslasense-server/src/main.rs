//! TeslaSense Server
//!
//! Polls the demo controller and serves sensor readings over REST

use anyhow::Result;
use std::sync::Arc;
use teslasense_core::VehicleData;
use teslasense_sensors::{DemoController, ShiftStateSensor};
use teslasense_server::{api, config::ServerConfig, manager, state};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting TeslaSense Server");

    let config = ServerConfig::from_env()?;

    let vehicle = VehicleData::new(1, 1001, "5YJ3E1EA7KF317000").with_display_name("Demo");
    let controller = Arc::new(DemoController::new().with_simulation());
    controller.add_vehicle(&vehicle);

    // Create application state
    let state = state::AppState::new(controller);
    state
        .register_sensor(Box::new(ShiftStateSensor::new(
            &vehicle,
            state.controller.clone(),
        )))
        .await;

    // Build the router
    let app = api::create_router(state.clone());

    // Start sensor manager in background
    tokio::spawn(manager::run(state.clone(), config.clone()));

    info!("Server listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
