//! Hardware abstraction traits
//!
//! These traits define the interface between the control-transfer handler
//! and the hardware drivers. Each has a hardware-backed implementation in
//! `stripsense-drivers` and deterministic doubles in the test suites.

pub mod pixel;
pub mod sensor;

pub use pixel::PixelWriter;
pub use sensor::{SensorError, TemperatureBus};
