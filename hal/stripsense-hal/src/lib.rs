//! stripsense Hardware Abstraction Layer
//!
//! This crate defines the two blocking primitives the firmware core calls
//! into. Chip-specific HALs implement them against real peripherals and the
//! host test suites implement them with deterministic doubles.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  stripsense-drivers (TMP102, WS2812)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  stripsense-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ stripsense-   │       │  test doubles │
//! │  hal-rp2040   │       │   (host)      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - I2C bus operations (sensor reads)
//! - [`pixel::PixelSink`] - Serial LED data line (one framed word per pixel)

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod pixel;

// Re-export key traits at crate root for convenience
pub use i2c::{I2cBus, I2cConfig, I2cError};
pub use pixel::PixelSink;
