//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in stripsense-core, built on the bus traits of stripsense-hal:
//!
//! - Temperature sensors (TMP102 over I2C)
//! - LED strips (WS2812 over a serial pixel sink)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod led;
pub mod sensor;

pub use led::Ws2812;
pub use sensor::Tmp102Bus;
