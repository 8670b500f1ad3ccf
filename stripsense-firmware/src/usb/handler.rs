//! embassy-usb control handler
//!
//! embassy-usb hands over an OUT transfer once its data stage has landed in
//! the control buffer, and an IN transfer at setup with a buffer to fill.
//! Both are forwarded to the board-agnostic [`ProtocolHandler`].

use defmt::*;
use embassy_rp::peripherals::PIO0;
use embassy_usb::control::{InResponse, OutResponse, Recipient, Request, RequestType};
use embassy_usb::driver::Direction as UsbDirection;
use embassy_usb::Handler;
use stripsense_core::ProtocolHandler;
use stripsense_drivers::{Tmp102Bus, Ws2812};
use stripsense_hal_rp2040::{PioWs2812, RpI2c};
use stripsense_protocol::{self as protocol, ControlRequest, RequestError};

use crate::config::{SensorI2c, PIXEL_COUNT, SENSOR_COUNT};

/// The protocol handler wired to this board's sensor bus and strip
pub type DeviceHandler = ProtocolHandler<
    Tmp102Bus<RpI2c<'static, SensorI2c>>,
    Ws2812<PioWs2812<'static, PIO0, 0>>,
    PIXEL_COUNT,
    SENSOR_COUNT,
>;

/// Translate an embassy-usb setup packet
fn control_request(req: &Request) -> ControlRequest {
    ControlRequest {
        direction: match req.direction {
            UsbDirection::Out => protocol::Direction::HostToDevice,
            UsbDirection::In => protocol::Direction::DeviceToHost,
        },
        request_type: match req.request_type {
            RequestType::Standard => protocol::RequestType::Standard,
            RequestType::Class => protocol::RequestType::Class,
            RequestType::Vendor => protocol::RequestType::Vendor,
            _ => protocol::RequestType::Reserved,
        },
        recipient: match req.recipient {
            Recipient::Device => protocol::Recipient::Device,
            Recipient::Interface => protocol::Recipient::Interface,
            Recipient::Endpoint => protocol::Recipient::Endpoint,
            Recipient::Other => protocol::Recipient::Other,
            _ => protocol::Recipient::Reserved,
        },
        request: req.request,
        value: req.value,
        index: req.index,
        length: req.length,
    }
}

/// Vendor request dispatcher registered with the USB builder
pub struct VendorControl {
    handler: DeviceHandler,
}

impl VendorControl {
    pub fn new(handler: DeviceHandler) -> Self {
        Self { handler }
    }

    fn rejected(&self, req: &ControlRequest, e: RequestError) {
        warn!(
            "Rejected vendor request 0x{=u8:x}: {} ({} rejected so far)",
            req.request,
            e,
            self.handler.stats().rejected
        );
    }
}

impl Handler for VendorControl {
    fn reset(&mut self) {
        debug!("USB bus reset");
    }

    fn configured(&mut self, configured: bool) {
        if configured {
            info!("USB configured, vendor requests enabled");
        } else {
            info!("USB deconfigured");
        }
    }

    fn control_out(&mut self, req: Request, data: &[u8]) -> Option<OutResponse> {
        let req = control_request(&req);
        let short_before = self.handler.stats().short_data_stages;

        match self.handler.control_out(&req, data) {
            Ok(rendered) => {
                let stats = self.handler.stats();
                if stats.short_data_stages != short_before {
                    warn!(
                        "SET_LED data stage was {} bytes, expected {}",
                        data.len(),
                        self.handler.pixels().byte_len()
                    );
                }
                if rendered {
                    debug!("SET_LED: frame {} rendered", stats.frames_rendered);
                }
                Some(OutResponse::Accepted)
            }
            Err(RequestError::NotVendor) => None,
            Err(e) => {
                self.rejected(&req, e);
                Some(OutResponse::Rejected)
            }
        }
    }

    fn control_in<'a>(&'a mut self, req: Request, buf: &'a mut [u8]) -> Option<InResponse<'a>> {
        let req = control_request(&req);

        let len = match self.handler.control_in(&req) {
            Ok(bytes) => {
                let len = bytes.len().min(buf.len());
                buf[..len].copy_from_slice(&bytes[..len]);
                len
            }
            Err(RequestError::NotVendor) => return None,
            Err(e) => {
                self.rejected(&req, e);
                return Some(InResponse::Rejected);
            }
        };

        let report = self.handler.last_report();
        if !report.is_clean() {
            warn!(
                "{} sensor(s) failed to read (mask 0x{=u32:x}, last error {}), sending stale values",
                report.failure_count(),
                report.failed,
                report.last_error
            );
        }
        debug!(
            "GET_TEMPERATURE: {} bytes, readings {}",
            len,
            self.handler.readings().values()
        );
        trace!("Handler stats: {}", self.handler.stats());

        Some(InResponse::Accepted(&buf[..len]))
    }
}
