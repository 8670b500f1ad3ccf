//! Configuration types
//!
//! Device configuration is fixed at compile time. These types validate it
//! once so the handler can rely on it afterwards.

pub mod sensors;

pub use sensors::{ConfigError, SensorAddresses};
