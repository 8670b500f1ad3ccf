//! Device configuration
//!
//! Everything here is generated from device.toml by the build script, which
//! has already validated it.

use stripsense_core::SensorAddresses;
use stripsense_protocol::{MatrixLayout, BYTES_PER_PIXEL};

include!(concat!(env!("OUT_DIR"), "/device_config.rs"));

/// Serpentine geometry of the strip
pub const LAYOUT: MatrixLayout = MatrixLayout::new(LED_COLUMNS, LED_ROWS);

/// Size of a full SET_LED payload
pub const PIXEL_PAYLOAD_LEN: usize = PIXEL_COUNT * BYTES_PER_PIXEL;

/// Sensor address set, checked again at compile time
pub const SENSORS: SensorAddresses<SENSOR_COUNT> = match SensorAddresses::new(SENSOR_ADDRESSES) {
    Ok(addresses) => addresses,
    Err(_) => panic!("invalid sensor address set in device.toml"),
};

// The layout and the pixel count come from the same two numbers
const _: () = assert!(LAYOUT.pixel_count() == PIXEL_COUNT);
