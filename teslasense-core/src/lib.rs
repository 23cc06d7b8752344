//! TeslaSense Core Library
//!
//! This crate provides the vehicle data model, the controller trait and the
//! shared device base that every sensor entity is composed from.

pub mod controller;
pub mod device;
pub mod entity;
pub mod error;
pub mod model;

pub use controller::Controller;
pub use device::VehicleDevice;
pub use entity::{SensorEntity, SensorReading};
pub use error::{Error, Result};
pub use model::{DriveParams, ShiftState, StateParams, VehicleData};
