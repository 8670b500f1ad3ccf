//! stripsense USB vendor protocol
//!
//! This crate defines the control-transfer protocol between a host
//! application and a stripsense device. Everything travels over the default
//! control pipe (EP0) as vendor requests:
//!
//! ```text
//! ┌──────────────────┬──────────┬─────────────┬──────────────────────────────┐
//! │ Request          │ bRequest │ Direction   │ Data stage                   │
//! ├──────────────────┼──────────┼─────────────┼──────────────────────────────┤
//! │ SET_LED          │ 0x01     │ host→device │ 3 bytes per pixel, G R B     │
//! │ GET_TEMPERATURE  │ 0x02     │ device→host │ 4 bytes per sensor, f32 LE   │
//! └──────────────────┴──────────┴─────────────┴──────────────────────────────┘
//! ```
//!
//! The device side only needs [`messages`] and [`temperature`]; [`frame`]
//! helps host tools build SET_LED payloads for the serpentine LED matrix.

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;
pub mod temperature;

pub use frame::{Color, FrameBuilder, FrameError, MatrixLayout, BYTES_PER_PIXEL};
pub use messages::{
    ControlRequest, Direction, Recipient, RequestError, RequestType, VendorRequest,
    REQ_GET_TEMPERATURE, REQ_SET_LED,
};
pub use temperature::{
    decode_temperatures, encode_temperatures, PayloadError, BYTES_PER_READING, MAX_SENSORS,
};
