//! Controller trait definition

use crate::error::Result;
use crate::model::{DriveParams, StateParams};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Polls the vehicle API and caches the latest state per vehicle
///
/// Devices never talk to the API themselves. They ask the controller to
/// refresh its cache through [`update`](Controller::update), then read the
/// cached blocks synchronously.
#[async_trait]
pub trait Controller: Send + Sync {
    /// Make sure the cached data for `vehicle_id` is fresh
    ///
    /// May suspend on network I/O. When the car is asleep it is only woken
    /// if `wake_if_asleep` is set; `force` bypasses the update interval.
    ///
    /// Returns whether the car is online after the update.
    async fn update(&self, vehicle_id: u64, wake_if_asleep: bool, force: bool) -> Result<bool>;

    /// Latest cached `drive_state` block, or `None` if nothing is cached
    fn get_drive_params(&self, vehicle_id: u64) -> Option<DriveParams>;

    /// Latest cached `vehicle_state` block, or `None` if nothing is cached
    fn get_state_params(&self, vehicle_id: u64) -> Option<StateParams>;

    /// Whether the car answered the last poll
    fn car_online(&self, vehicle_id: u64) -> bool;

    /// When the cache for this car was last refreshed
    fn last_update_time(&self, vehicle_id: u64) -> Option<DateTime<Utc>>;

    /// When this car was last woken up
    fn last_wake_up_time(&self, vehicle_id: u64) -> Option<DateTime<Utc>>;

    /// Minimum time between API polls of a car
    fn update_interval(&self) -> Duration;
}
