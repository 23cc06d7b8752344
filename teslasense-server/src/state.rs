//! Application state management

use std::sync::Arc;
use teslasense_core::{Controller, SensorEntity, SensorReading};
use tokio::sync::RwLock;
use tracing::info;

/// One registered entity; the lock serializes its updates
pub type SharedSensor = Arc<RwLock<Box<dyn SensorEntity>>>;

/// Registry entry; the name is copied out so lookups never wait on a sensor
#[derive(Clone)]
pub struct RegisteredSensor {
    pub uniq_name: String,
    pub sensor: SharedSensor,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Controller every registered sensor reads from
    pub controller: Arc<dyn Controller>,

    /// All registered sensor entities
    pub sensors: Arc<RwLock<Vec<RegisteredSensor>>>,
}

impl AppState {
    pub fn new(controller: Arc<dyn Controller>) -> Self {
        Self {
            controller,
            sensors: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register a sensor entity
    pub async fn register_sensor(&self, sensor: Box<dyn SensorEntity>) {
        let uniq_name = sensor.device().uniq_name().to_string();
        info!("Registered sensor {}", uniq_name);
        let mut sensors = self.sensors.write().await;
        sensors.push(RegisteredSensor {
            uniq_name,
            sensor: Arc::new(RwLock::new(sensor)),
        });
    }

    /// Look up a sensor by its unique name
    pub async fn find_sensor(&self, uniq_name: &str) -> Option<SharedSensor> {
        let sensors = self.sensors.read().await;
        sensors
            .iter()
            .find(|entry| entry.uniq_name == uniq_name)
            .map(|entry| entry.sensor.clone())
    }

    /// Current reading of every sensor, in registration order
    pub async fn readings(&self) -> Vec<SensorReading> {
        let sensors = self.sensors.read().await.clone();
        let mut readings = Vec::with_capacity(sensors.len());
        for entry in sensors {
            readings.push(entry.sensor.read().await.snapshot());
        }
        readings
    }
}
