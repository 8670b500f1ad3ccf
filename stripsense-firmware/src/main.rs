//! stripsense - USB LED Matrix and Temperature Sensor Firmware
//!
//! Main firmware binary for RP2040-based boards. The device enumerates as
//! a vendor-specific USB function and answers two control requests:
//!
//! - SET_LED (0x01): replace the WS2812 frame and render it
//! - GET_TEMPERATURE (0x02): sample every TMP102 and return the readings
//!
//! Pin assignments, pixel count and sensor addresses come from
//! device.toml, compiled in by the build script.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{PIO0, USB};
use embassy_rp::pio::Pio;
use embassy_rp::usb::Driver;
use embassy_time::Timer;
use embassy_usb::{Builder, Config as UsbConfig};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use stripsense_core::ProtocolHandler;
use stripsense_drivers::{Tmp102Bus, Ws2812};
use stripsense_hal::I2cConfig;
use stripsense_hal_rp2040::pio::frame_time_us;
use stripsense_hal_rp2040::{PioWs2812, RpI2c};

use crate::config::*;
use crate::usb::VendorControl;

#[macro_use]
mod config;
mod tasks;
mod usb;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

/// EP0 buffer; an OUT data stage must fit in it whole
const CONTROL_BUF_LEN: usize = if PIXEL_PAYLOAD_LEN > 256 {
    PIXEL_PAYLOAD_LEN
} else {
    256
};

/// TMP102 first conversion after power-up takes 26 ms
const SENSOR_STARTUP_MS: u64 = 30;

// Static cells for USB buffers and the handler (must live forever)
static CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESC: StaticCell<[u8; 0]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; CONTROL_BUF_LEN]> = StaticCell::new();
static VENDOR: StaticCell<VendorControl> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("stripsense firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Sensor bus
    let i2c = RpI2c::new(
        sensor_i2c!(p),
        scl_pin!(p),
        sda_pin!(p),
        I2cConfig {
            frequency: I2C_FREQUENCY_HZ,
        },
    );
    let mut sensors = Tmp102Bus::new(i2c);

    Timer::after_millis(SENSOR_STARTUP_MS).await;
    for address in SENSORS.iter() {
        match sensors.select_temperature_register(address) {
            Ok(()) => debug!("TMP102 at 0x{=u8:x} ready", address),
            Err(e) => warn!("TMP102 at 0x{=u8:x} not ready: {}", address, e),
        }
    }
    info!("I2C initialized: {} sensors", SENSOR_COUNT);

    // Setup PIO0 state machine 0 for the strip data line
    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);
    let strip = Ws2812::new(PioWs2812::new(
        &mut common,
        sm0,
        led_pin!(p),
        LED_BIT_RATE_HZ,
    ));
    info!(
        "PIO WS2812 initialized: {}x{} pixels at {} Hz, {} us per frame",
        LAYOUT.columns,
        LAYOUT.rows,
        LED_BIT_RATE_HZ,
        frame_time_us(PIXEL_COUNT as u32, LED_BIT_RATE_HZ)
    );

    // Start dark, matching the zeroed pixel buffer
    let mut handler = ProtocolHandler::new(sensors, strip, SENSORS);
    handler.blank();

    // USB device
    let driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(USB_VID, USB_PID);
    usb_config.manufacturer = Some(USB_MANUFACTURER);
    usb_config.product = Some(USB_PRODUCT);
    usb_config.serial_number = Some(USB_SERIAL_NUMBER);
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        driver,
        usb_config,
        CONFIG_DESC.init([0; 256]),
        BOS_DESC.init([0; 256]),
        MSOS_DESC.init([0; 0]),
        CONTROL_BUF.init([0; CONTROL_BUF_LEN]),
    );

    // One vendor-specific interface, no endpoints: everything goes over EP0
    {
        let mut function = builder.function(0xFF, 0x00, 0x00);
        let mut interface = function.interface();
        let _alt = interface.alt_setting(0xFF, 0x00, 0x00, None);
    }

    builder.handler(VENDOR.init(VendorControl::new(handler)));
    let usb = builder.build();

    info!(
        "USB initialized: {=u16:x}:{=u16:x}, control buffer {} bytes",
        USB_VID, USB_PID, CONTROL_BUF_LEN
    );

    // Spawn tasks
    unwrap!(spawner.spawn(tasks::usb_task(usb)));

    info!("All tasks spawned, firmware running");
}
