//! Board-agnostic core logic for the stripsense firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (temperature bus, pixel writer)
//! - Pixel buffer and frame rendering
//! - Temperature readings and sensor sampling
//! - Control transfer state machine
//! - Vendor request handler
//! - Sensor address configuration

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod handler;
pub mod pixels;
pub mod readings;
pub mod state;
pub mod traits;

pub use config::{ConfigError, SensorAddresses};
pub use handler::{HandlerStats, ProtocolHandler, SetupAction};
pub use pixels::PixelBuffer;
pub use readings::{SampleReport, TemperatureReadings};
pub use state::{TransferEvent, TransferState};
