//! Vehicle sensor adapters for TeslaSense

pub mod demo;
pub mod shift_state;

pub use demo::DemoController;
pub use shift_state::ShiftStateSensor;
