//! Embassy async tasks
//!
//! A single task services the USB stack. Vendor requests are handled
//! synchronously inside it, so the pixel buffer and the readings are only
//! ever touched from one place.

pub mod usb;

pub use usb::usb_task;
