//! Shift state sensor
//!
//! Republishes the transmission position from the cached `drive_state`
//! block. A populated block with no usable token reads as Park.

use async_trait::async_trait;
use std::sync::Arc;
use teslasense_core::{
    Controller, Result, SensorEntity, ShiftState, VehicleData, VehicleDevice,
};
use tracing::debug;

/// Token reported when the car sends a block without a shift state
pub const DEFAULT_SHIFT_STATE: &str = "P";

const SENSOR_TYPE: &str = "shiftstate sensor";
const BIN_TYPE: u8 = 0xA;

/// Shift state sensor for one vehicle
#[derive(Debug)]
pub struct ShiftStateSensor {
    device: VehicleDevice,
    shift_state: Option<String>,
    device_class: Option<String>,
}

impl ShiftStateSensor {
    /// Create the sensor; the value stays unset until the first refresh
    pub fn new(data: &VehicleData, controller: Arc<dyn Controller>) -> Self {
        let device = VehicleDevice::new(data, controller, SENSOR_TYPE).with_bin_type(BIN_TYPE);

        Self {
            device,
            shift_state: None,
            device_class: None,
        }
    }

    /// Shift state sensors never report a battery
    pub fn has_battery() -> bool {
        false
    }

    /// Typed view of the stored token, `None` if unset or unrecognised
    pub fn shift_state(&self) -> Option<ShiftState> {
        self.shift_state.as_deref()?.parse().ok()
    }
}

#[async_trait]
impl SensorEntity for ShiftStateSensor {
    fn device(&self) -> &VehicleDevice {
        &self.device
    }

    /// `force` is not passed on; the device update always honours the
    /// controller's update interval
    async fn update(&mut self, wake_if_asleep: bool, _force: bool) -> Result<()> {
        self.device.update(wake_if_asleep, false).await?;
        self.refresh();
        Ok(())
    }

    fn refresh(&mut self) {
        self.device.refresh();

        let params = self.device.controller().get_drive_params(self.device.id());
        // No block (or an empty one) keeps the previous reading
        let Some(params) = params.filter(|p| !p.is_empty()) else {
            return;
        };

        let shift_state = match params.shift_state {
            Some(token) if !token.is_empty() => token,
            _ => DEFAULT_SHIFT_STATE.to_string(),
        };
        debug!(vehicle = self.device.id(), %shift_state, "shift state refreshed");
        self.shift_state = Some(shift_state);
    }

    fn get_value(&self) -> Option<String> {
        self.shift_state.clone()
    }

    fn has_battery(&self) -> bool {
        ShiftStateSensor::has_battery()
    }

    fn device_class(&self) -> Option<&str> {
        self.device_class.as_deref()
    }
}
