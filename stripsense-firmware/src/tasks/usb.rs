//! USB servicing task

use defmt::*;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::UsbDevice;

/// Run the USB device forever
///
/// Every control transfer, including both vendor requests, is handled from
/// inside `run`. A blocking sensor read or frame render stalls the stack
/// until it finishes.
#[embassy_executor::task]
pub async fn usb_task(mut usb: UsbDevice<'static, Driver<'static, USB>>) -> ! {
    info!("USB task started");
    usb.run().await
}
