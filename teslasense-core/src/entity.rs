//! Sensor entity contract expected by the host integration

use crate::device::VehicleDevice;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A read-only value published for one vehicle
///
/// Each entity embeds a [`VehicleDevice`] and adds its own extraction
/// logic on top of the controller cache. The host is responsible for
/// serializing calls per entity; `update` and `refresh` take `&mut self`.
#[async_trait]
pub trait SensorEntity: Send + Sync {
    /// The embedded device base
    fn device(&self) -> &VehicleDevice;

    /// Refresh the controller cache, then re-read this entity's value
    ///
    /// Errors from the controller are returned unchanged.
    async fn update(&mut self, wake_if_asleep: bool, force: bool) -> Result<()>;

    /// Re-read this entity's value from the controller cache
    ///
    /// Non-blocking; never touches the network.
    fn refresh(&mut self);

    /// Current value, `None` until something has been observed
    fn get_value(&self) -> Option<String>;

    /// Whether this entity represents a battery-backed device
    fn has_battery(&self) -> bool;

    /// Home-automation device class, if the entity has a specialized one
    fn device_class(&self) -> Option<&str>;

    /// Serializable view of the entity for the host API
    fn snapshot(&self) -> SensorReading {
        let device = self.device();
        SensorReading {
            uniq_name: device.uniq_name().to_string(),
            name: device.name().to_string(),
            kind: device.kind().to_string(),
            value: self.get_value(),
            device_class: self.device_class().map(str::to_string),
            unit: device.measurement().map(str::to_string),
            available: device.available(),
            assumed_state: device.assumed_state(),
        }
    }
}

/// Point-in-time reading of one sensor entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub uniq_name: String,
    pub name: String,
    pub kind: String,
    pub value: Option<String>,
    pub device_class: Option<String>,
    pub unit: Option<String>,
    pub available: bool,
    pub assumed_state: bool,
}
