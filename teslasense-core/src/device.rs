//! Shared vehicle device base
//!
//! Every sensor entity embeds a [`VehicleDevice`] for identity, naming and
//! the generic update/refresh lifecycle. The device owns no telemetry; it
//! reads from the shared [`Controller`] cache.

use crate::controller::Controller;
use crate::error::Result;
use crate::model::VehicleData;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Identity and lifecycle hooks for one entity of one vehicle
pub struct VehicleDevice {
    id: u64,
    vehicle_id: u64,
    vin: String,
    display_name: Option<String>,
    car_type: String,
    car_version: Option<String>,
    sentry_mode_available: bool,

    /// Entity type tag, e.g. "shiftstate sensor"
    kind: String,
    hass_type: String,
    measurement: Option<String>,
    bin_type: u8,
    should_poll: bool,

    name: String,
    uniq_name: String,

    controller: Arc<dyn Controller>,
}

impl VehicleDevice {
    /// Build the device base for one entity of `data`
    ///
    /// Names are derived here and never change afterwards.
    pub fn new(data: &VehicleData, controller: Arc<dyn Controller>, kind: impl Into<String>) -> Self {
        let kind = kind.into();
        let car_type = format!(
            "Model {}",
            data.vin
                .chars()
                .nth(3)
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or('?')
        );

        let name = match data.display_name.as_deref() {
            Some(display_name) if !display_name.is_empty() => format!("{} {}", display_name, kind),
            _ => format!("Tesla {} {}", car_type, kind),
        };

        let vin_tail_start = data.vin.len().saturating_sub(6);
        let vin_tail = data.vin.get(vin_tail_start..).unwrap_or(&data.vin);
        let uniq_name = format!("Tesla {} {} {}", car_type, vin_tail, kind);

        Self {
            id: data.id,
            vehicle_id: data.vehicle_id,
            vin: data.vin.clone(),
            display_name: data.display_name.clone(),
            car_type,
            car_version: None,
            sentry_mode_available: false,
            kind,
            hass_type: "sensor".to_string(),
            measurement: None,
            bin_type: 0,
            should_poll: true,
            name,
            uniq_name,
            controller,
        }
    }

    pub fn with_bin_type(mut self, bin_type: u8) -> Self {
        self.bin_type = bin_type;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn vehicle_id(&self) -> u64 {
        self.vehicle_id
    }

    pub fn vin(&self) -> &str {
        &self.vin
    }

    /// Owner-assigned display name
    pub fn car_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// "Model S", "Model 3", ... derived from the VIN
    pub fn car_type(&self) -> &str {
        &self.car_type
    }

    /// Firmware version, once a state block has been seen
    pub fn car_version(&self) -> Option<&str> {
        self.car_version.as_deref()
    }

    pub fn sentry_mode_available(&self) -> bool {
        self.sentry_mode_available
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn hass_type(&self) -> &str {
        &self.hass_type
    }

    /// Unit of measurement
    pub fn measurement(&self) -> Option<&str> {
        self.measurement.as_deref()
    }

    pub fn bin_type(&self) -> u8 {
        self.bin_type
    }

    pub fn should_poll(&self) -> bool {
        self.should_poll
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uniq_name(&self) -> &str {
        &self.uniq_name
    }

    pub fn controller(&self) -> &Arc<dyn Controller> {
        &self.controller
    }

    /// Whether the car answered the last poll
    pub fn available(&self) -> bool {
        self.controller.car_online(self.id)
    }

    /// True while the car is offline and our data predates its last wake-up
    /// by more than one update interval
    pub fn assumed_state(&self) -> bool {
        if self.controller.car_online(self.id) {
            return false;
        }

        match (
            self.controller.last_update_time(self.id),
            self.controller.last_wake_up_time(self.id),
        ) {
            (Some(updated), Some(woken)) => (updated - woken)
                .to_std()
                .map(|elapsed| elapsed > self.controller.update_interval())
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Ask the controller to refresh its cache, then pull shared fields
    ///
    /// Controller errors are returned unchanged.
    pub async fn update(&mut self, wake_if_asleep: bool, force: bool) -> Result<()> {
        let online = self
            .controller
            .update(self.id, wake_if_asleep, force)
            .await?;
        debug!(vehicle = self.id, online, "{} updated", self.uniq_name);
        self.refresh();
        Ok(())
    }

    /// Copy shared fields from the cached state block
    ///
    /// Assumes the controller is already up to date.
    pub fn refresh(&mut self) {
        if let Some(state) = self.controller.get_state_params(self.id) {
            if let Some(version) = state.car_version {
                self.car_version = Some(version);
            }
            if let Some(available) = state.sentry_mode_available {
                self.sentry_mode_available = available;
            }
        }
    }
}

impl fmt::Debug for VehicleDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VehicleDevice")
            .field("id", &self.id)
            .field("vehicle_id", &self.vehicle_id)
            .field("kind", &self.kind)
            .field("uniq_name", &self.uniq_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{DriveParams, StateParams};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration as ChronoDuration, Utc};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct StaticController {
        online: bool,
        state: Mutex<Option<StateParams>>,
        last_update: Option<DateTime<Utc>>,
        last_wake: Option<DateTime<Utc>>,
        fail: Option<Error>,
    }

    #[async_trait]
    impl Controller for StaticController {
        async fn update(&self, _vehicle_id: u64, _wake: bool, _force: bool) -> Result<bool> {
            match &self.fail {
                Some(e) => Err(e.clone()),
                None => Ok(self.online),
            }
        }

        fn get_drive_params(&self, _vehicle_id: u64) -> Option<DriveParams> {
            None
        }

        fn get_state_params(&self, _vehicle_id: u64) -> Option<StateParams> {
            self.state.lock().unwrap().clone()
        }

        fn car_online(&self, _vehicle_id: u64) -> bool {
            self.online
        }

        fn last_update_time(&self, _vehicle_id: u64) -> Option<DateTime<Utc>> {
            self.last_update
        }

        fn last_wake_up_time(&self, _vehicle_id: u64) -> Option<DateTime<Utc>> {
            self.last_wake
        }

        fn update_interval(&self) -> Duration {
            Duration::from_secs(300)
        }
    }

    fn vehicle() -> VehicleData {
        VehicleData::new(12345, 678, "5YJ3E1EA7KF317000")
    }

    #[test]
    fn test_names_without_display_name() {
        let device = VehicleDevice::new(
            &vehicle(),
            Arc::new(StaticController::default()),
            "shiftstate sensor",
        );
        assert_eq!(device.car_type(), "Model 3");
        assert_eq!(device.name(), "Tesla Model 3 shiftstate sensor");
        assert_eq!(device.uniq_name(), "Tesla Model 3 317000 shiftstate sensor");
    }

    #[test]
    fn test_names_with_display_name() {
        let data = vehicle().with_display_name("Nikola");
        let device = VehicleDevice::new(&data, Arc::new(StaticController::default()), "odometer sensor");
        assert_eq!(device.name(), "Nikola odometer sensor");
        assert_eq!(device.uniq_name(), "Tesla Model 3 317000 odometer sensor");
    }

    #[test]
    fn test_empty_display_name_falls_back_to_model() {
        let data = vehicle().with_display_name("");
        let device = VehicleDevice::new(&data, Arc::new(StaticController::default()), "x");
        assert_eq!(device.name(), "Tesla Model 3 x");
    }

    #[test]
    fn test_sensor_metadata_defaults() {
        let device = VehicleDevice::new(&vehicle(), Arc::new(StaticController::default()), "x");
        assert_eq!(device.hass_type(), "sensor");
        assert_eq!(device.measurement(), None);
        assert_eq!(device.bin_type(), 0);
        assert!(device.should_poll());

        let device = device.with_bin_type(0xA);
        assert_eq!(device.bin_type(), 0xA);
    }

    #[test]
    fn test_short_vin() {
        let data = VehicleData::new(1, 2, "5Y");
        let device = VehicleDevice::new(&data, Arc::new(StaticController::default()), "x");
        assert_eq!(device.car_type(), "Model ?");
        assert_eq!(device.uniq_name(), "Tesla Model ? 5Y x");
    }

    #[test]
    fn test_refresh_copies_state_fields() {
        let controller = Arc::new(StaticController::default());
        *controller.state.lock().unwrap() = Some(StateParams {
            car_version: Some("2024.8.7".to_string()),
            sentry_mode_available: Some(true),
            ..StateParams::default()
        });
        let mut device = VehicleDevice::new(&vehicle(), controller.clone(), "x");
        assert_eq!(device.car_version(), None);

        device.refresh();
        assert_eq!(device.car_version(), Some("2024.8.7"));
        assert!(device.sentry_mode_available());

        // A later block without the fields keeps what we had
        *controller.state.lock().unwrap() = Some(StateParams::default());
        device.refresh();
        assert_eq!(device.car_version(), Some("2024.8.7"));
        assert!(device.sentry_mode_available());
    }

    #[tokio::test]
    async fn test_update_propagates_controller_error() {
        let controller = Arc::new(StaticController {
            fail: Some(Error::VehicleAsleep { vehicle_id: 12345 }),
            ..StaticController::default()
        });
        let mut device = VehicleDevice::new(&vehicle(), controller, "x");
        let err = device.update(false, false).await.unwrap_err();
        assert_eq!(err, Error::VehicleAsleep { vehicle_id: 12345 });
    }

    #[test]
    fn test_assumed_state() {
        let now = Utc::now();
        let stale = StaticController {
            online: false,
            last_update: Some(now),
            last_wake: Some(now - ChronoDuration::seconds(600)),
            ..StaticController::default()
        };
        let device = VehicleDevice::new(&vehicle(), Arc::new(stale), "x");
        assert!(device.assumed_state());
        assert!(!device.available());

        let recent = StaticController {
            online: false,
            last_update: Some(now),
            last_wake: Some(now - ChronoDuration::seconds(60)),
            ..StaticController::default()
        };
        let device = VehicleDevice::new(&vehicle(), Arc::new(recent), "x");
        assert!(!device.assumed_state());

        let online = StaticController {
            online: true,
            last_update: Some(now),
            last_wake: Some(now - ChronoDuration::seconds(600)),
            ..StaticController::default()
        };
        let device = VehicleDevice::new(&vehicle(), Arc::new(online), "x");
        assert!(!device.assumed_state());
        assert!(device.available());
    }
}
