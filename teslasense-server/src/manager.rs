//! Sensor polling manager
//!
//! Periodically asks every registered sensor to update. A failing sensor
//! is logged and retried on the next poll; it never stops the loop.

use crate::config::ServerConfig;
use crate::state::AppState;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Main manager loop
pub async fn run(state: AppState, config: ServerConfig) {
    info!(
        "Sensor manager started, polling every {:?}",
        config.poll_interval
    );

    loop {
        let failures = poll_once(&state, config.wake_if_asleep).await;
        if failures > 0 {
            debug!("Poll finished with {} failed sensor(s)", failures);
        }

        sleep(config.poll_interval).await;
    }
}

/// Update every registered sensor once, returning how many failed
pub async fn poll_once(state: &AppState, wake_if_asleep: bool) -> usize {
    // Clone the handles so registration is not blocked while we poll
    let sensors = state.sensors.read().await.clone();
    let mut failures = 0;

    for entry in sensors {
        let mut sensor = entry.sensor.write().await;
        if let Err(e) = sensor.update(wake_if_asleep, false).await {
            warn!("Error updating {}: {}", sensor.device().uniq_name(), e);
            failures += 1;
        }
    }

    failures
}
