//! RP2040-specific HAL for the stripsense firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `stripsense-hal` traits:
//!
//! - Blocking I2C master (implements `stripsense_hal::I2cBus`)
//! - PIO-based WS2812 data line (implements `stripsense_hal::PixelSink`)
//! - PIO bit timing and clock divider math

#![no_std]

pub mod i2c;
pub mod pio;
pub mod ws2812;

pub use i2c::RpI2c;
pub use ws2812::PioWs2812;
