//! USB device: embassy-usb stack with one vendor interface
//!
//! The interface has no endpoints of its own. Both vendor requests travel
//! on the default control pipe and are dispatched to [`VendorControl`].

pub mod handler;

pub use handler::{DeviceHandler, VendorControl};
