//! Demo controller that serves synthetic cached telemetry
//!
//! Stands in for the real API controller in tests and in the demo server.
//! Each vehicle's cache can be scripted directly, and with simulation
//! enabled every successful update advances a short drive cycle:
//! parked, reversing out, driving, coasting in neutral, driving, parked.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Duration;
use teslasense_core::{Controller, DriveParams, Error, Result, StateParams, VehicleData};
use tracing::{debug, info};

const DEMO_CAR_VERSION: &str = "2024.14.9";

// =============================================================================
// Drive cycle: (shift state, speed mph, power kW)
// =============================================================================

const DRIVE_CYCLE: [(&str, f64, f64); 6] = [
    ("P", 0.0, 0.0),
    ("R", 3.0, 4.0),
    ("D", 35.0, 18.0),
    ("N", 22.0, 0.0),
    ("D", 55.0, 32.0),
    ("P", 0.0, 0.0),
];

fn cycle_params(step: usize, now: DateTime<Utc>) -> DriveParams {
    let (shift_state, speed, power) = DRIVE_CYCLE[step % DRIVE_CYCLE.len()];
    DriveParams {
        shift_state: Some(shift_state.to_string()),
        speed: Some(speed),
        power: Some(power),
        latitude: Some(37.4924),
        longitude: Some(-121.9447),
        heading: Some(90.0),
        gps_as_of: Some(now.timestamp()),
        timestamp: Some(now.timestamp_millis()),
        ..DriveParams::default()
    }
}

struct DemoVehicle {
    online: bool,
    drive: Option<DriveParams>,
    state: Option<StateParams>,
    last_update: Option<DateTime<Utc>>,
    last_wake: Option<DateTime<Utc>>,
    cycle_step: usize,
}

/// In-memory [`Controller`] with a scriptable cache
pub struct DemoController {
    vehicles: RwLock<HashMap<u64, DemoVehicle>>,
    update_interval: Duration,
    simulate: bool,
    update_count: AtomicU64,
    next_failure: Mutex<Option<Error>>,
}

impl DemoController {
    /// Controller with simulation off and no update interval
    pub fn new() -> Self {
        Self {
            vehicles: RwLock::new(HashMap::new()),
            update_interval: Duration::ZERO,
            simulate: false,
            update_count: AtomicU64::new(0),
            next_failure: Mutex::new(None),
        }
    }

    /// Advance the drive cycle on every successful update
    pub fn with_simulation(mut self) -> Self {
        self.simulate = true;
        self
    }

    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Register a vehicle; it starts online with an empty cache
    pub fn add_vehicle(&self, data: &VehicleData) {
        let online = data.state.as_deref().map_or(true, |s| s == "online");
        info!(vehicle = data.id, vin = %data.vin, online, "demo vehicle registered");
        self.write().insert(
            data.id,
            DemoVehicle {
                online,
                drive: None,
                state: None,
                last_update: None,
                last_wake: None,
                cycle_step: 0,
            },
        );
    }

    /// Replace the cached drive block; `None` clears it
    pub fn set_drive_params(&self, vehicle_id: u64, params: Option<DriveParams>) {
        if let Some(vehicle) = self.write().get_mut(&vehicle_id) {
            vehicle.drive = params;
        }
    }

    /// Replace the cached state block; `None` clears it
    pub fn set_state_params(&self, vehicle_id: u64, params: Option<StateParams>) {
        if let Some(vehicle) = self.write().get_mut(&vehicle_id) {
            vehicle.state = params;
        }
    }

    pub fn set_online(&self, vehicle_id: u64, online: bool) {
        if let Some(vehicle) = self.write().get_mut(&vehicle_id) {
            vehicle.online = online;
        }
    }

    /// Make the next `update` call fail with `error`
    pub fn fail_next_update(&self, error: Error) {
        *self
            .next_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Number of `update` calls so far, failed ones included
    pub fn update_count(&self) -> u64 {
        self.update_count.load(Ordering::SeqCst)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<u64, DemoVehicle>> {
        self.vehicles.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<u64, DemoVehicle>> {
        self.vehicles.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DemoController {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Controller for DemoController {
    async fn update(&self, vehicle_id: u64, wake_if_asleep: bool, force: bool) -> Result<bool> {
        self.update_count.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self
            .next_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            return Err(error);
        }

        let now = Utc::now();
        let mut vehicles = self.write();
        let vehicle = vehicles
            .get_mut(&vehicle_id)
            .ok_or(Error::VehicleNotFound { vehicle_id })?;

        if !vehicle.online {
            if !wake_if_asleep {
                debug!(vehicle = vehicle_id, "asleep, not waking");
                return Ok(false);
            }
            info!(vehicle = vehicle_id, "waking vehicle");
            vehicle.online = true;
            vehicle.last_wake = Some(now);
        }

        let within_interval = vehicle.last_update.is_some_and(|last| {
            (now - last)
                .to_std()
                .map(|elapsed| elapsed < self.update_interval)
                .unwrap_or(true)
        });
        if within_interval && !force {
            debug!(vehicle = vehicle_id, "cache still fresh");
            return Ok(true);
        }

        if self.simulate {
            vehicle.drive = Some(cycle_params(vehicle.cycle_step, now));
            vehicle.cycle_step = (vehicle.cycle_step + 1) % DRIVE_CYCLE.len();
            if vehicle.state.is_none() {
                vehicle.state = Some(StateParams {
                    car_version: Some(DEMO_CAR_VERSION.to_string()),
                    sentry_mode_available: Some(true),
                    ..StateParams::default()
                });
            }
        }
        vehicle.last_update = Some(now);

        Ok(true)
    }

    fn get_drive_params(&self, vehicle_id: u64) -> Option<DriveParams> {
        self.read().get(&vehicle_id)?.drive.clone()
    }

    fn get_state_params(&self, vehicle_id: u64) -> Option<StateParams> {
        self.read().get(&vehicle_id)?.state.clone()
    }

    fn car_online(&self, vehicle_id: u64) -> bool {
        self.read().get(&vehicle_id).is_some_and(|v| v.online)
    }

    fn last_update_time(&self, vehicle_id: u64) -> Option<DateTime<Utc>> {
        self.read().get(&vehicle_id)?.last_update
    }

    fn last_wake_up_time(&self, vehicle_id: u64) -> Option<DateTime<Utc>> {
        self.read().get(&vehicle_id)?.last_wake
    }

    fn update_interval(&self) -> Duration {
        self.update_interval
    }
}
