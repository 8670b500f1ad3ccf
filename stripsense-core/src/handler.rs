//! Vendor control-transfer handler
//!
//! [`ProtocolHandler`] owns every piece of mutable device state: the pixel
//! buffer, the temperature readings, the sensor address set and both
//! hardware drivers. The USB stack drives it one stage at a time:
//!
//! ```text
//!   setup(req) ──► SetupAction ──► data stage ──► data_complete(len) ──► ack(req)
//!                  │                                                     │
//!                  ├─ Receive: host writes into the pixel buffer         └─ SET_LED: render
//!                  ├─ Transmit: readings sampled, sent to the host
//!                  ├─ Reject: stall
//!                  └─ Ignore: not a vendor request
//! ```
//!
//! Stacks that deliver a whole transfer in one callback use
//! [`ProtocolHandler::control_out`] and [`ProtocolHandler::control_in`].

use stripsense_protocol::{ControlRequest, RequestError, VendorRequest};

use crate::config::SensorAddresses;
use crate::pixels::PixelBuffer;
use crate::readings::{SampleReport, TemperatureReadings};
use crate::state::{TransferEvent, TransferState};
use crate::traits::{PixelWriter, TemperatureBus};

/// What the USB stack must do after a setup stage
#[derive(Debug, PartialEq)]
pub enum SetupAction<'a> {
    /// Not a vendor request; the stack handles it
    Ignore,
    /// Decline the transfer (stall)
    Reject(RequestError),
    /// Arm an OUT data stage into this buffer
    Receive(&'a mut [u8]),
    /// Arm an IN data stage from this buffer
    Transmit(&'a [u8]),
}

/// Running counters, wrapping on overflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandlerStats {
    /// Full frames pushed to the strip
    pub frames_rendered: u32,
    /// Sampling rounds (one per GET_TEMPERATURE)
    pub samples: u32,
    /// Vendor requests declined at setup
    pub rejected: u32,
    /// Individual sensor reads that failed
    pub sensor_failures: u32,
    /// Data stages that moved fewer bytes than were armed
    pub short_data_stages: u32,
}

/// Vendor request handler for `P` pixels and `M` sensors
pub struct ProtocolHandler<B, W, const P: usize, const M: usize> {
    pixels: PixelBuffer<P>,
    readings: TemperatureReadings<M>,
    addresses: SensorAddresses<M>,
    bus: B,
    strip: W,
    state: TransferState,
    armed: usize,
    stats: HandlerStats,
    last_report: SampleReport,
}

impl<B, W, const P: usize, const M: usize> ProtocolHandler<B, W, P, M>
where
    B: TemperatureBus,
    W: PixelWriter,
{
    /// Create a handler with a zeroed pixel buffer and 0.0 °C readings
    ///
    /// Nothing is rendered or sampled until the first request.
    pub fn new(bus: B, strip: W, addresses: SensorAddresses<M>) -> Self {
        Self {
            pixels: PixelBuffer::new(),
            readings: TemperatureReadings::new(),
            addresses,
            bus,
            strip,
            state: TransferState::Idle,
            armed: 0,
            stats: HandlerStats::default(),
            last_report: SampleReport::default(),
        }
    }

    /// Handle a setup stage
    pub fn setup(&mut self, req: &ControlRequest) -> SetupAction<'_> {
        let vendor = match VendorRequest::classify(req) {
            Ok(vendor) => vendor,
            Err(e) => {
                self.state = self.state.transition(TransferEvent::Cancel);
                if !e.is_rejection() {
                    return SetupAction::Ignore;
                }
                self.stats.rejected = self.stats.rejected.wrapping_add(1);
                return SetupAction::Reject(e);
            }
        };

        self.state = self.state.transition(TransferEvent::Setup(vendor));

        match vendor {
            VendorRequest::SetLed => {
                self.armed = self.pixels.byte_len();
                SetupAction::Receive(self.pixels.as_bytes_mut())
            }
            VendorRequest::GetTemperature => {
                self.sample();
                self.armed = self.readings.as_bytes().len();
                SetupAction::Transmit(self.readings.as_bytes())
            }
        }
    }

    /// Handle the end of the data stage
    ///
    /// `len` is the number of bytes the stack actually moved. A short stage
    /// is counted but not refused: the part of the pixel buffer that was not
    /// written keeps its previous contents.
    pub fn data_complete(&mut self, len: usize) {
        if !matches!(self.state, TransferState::AwaitingData(_)) {
            return;
        }

        if len < self.armed {
            self.stats.short_data_stages = self.stats.short_data_stages.wrapping_add(1);
        }
        self.state = self.state.transition(TransferEvent::DataComplete);
    }

    /// Handle the status stage
    ///
    /// Returns true if a frame was rendered.
    pub fn ack(&mut self, req: &ControlRequest) -> bool {
        if !req.is_vendor() {
            return false;
        }

        let render = self.state.renders_on_ack()
            && self.state.request().map(VendorRequest::code) == Some(req.request);

        self.state = self.state.transition(TransferEvent::Ack);
        if render {
            self.render();
        }
        render
    }

    /// Run a complete host-to-device transfer whose data already arrived
    ///
    /// Returns whether a frame was rendered, or why the request was not
    /// taken. [`RequestError::NotVendor`] means the request belongs to the
    /// USB stack.
    pub fn control_out(&mut self, req: &ControlRequest, data: &[u8]) -> Result<bool, RequestError> {
        match self.setup(req) {
            SetupAction::Ignore => return Err(RequestError::NotVendor),
            SetupAction::Reject(e) => return Err(e),
            SetupAction::Receive(_) => {}
            SetupAction::Transmit(_) => {
                self.state = self.state.transition(TransferEvent::Cancel);
                return Err(RequestError::WrongDirection(req.request));
            }
        }

        let len = self.pixels.load(data);
        self.data_complete(len);
        Ok(self.ack(req))
    }

    /// Run a complete device-to-host transfer
    ///
    /// Samples the sensors and returns the bytes to send, at most
    /// `req.length` of them. The stack reports no completion for IN data,
    /// so the transfer is finished here.
    pub fn control_in(&mut self, req: &ControlRequest) -> Result<&[u8], RequestError> {
        let len = match self.setup(req) {
            SetupAction::Ignore => return Err(RequestError::NotVendor),
            SetupAction::Reject(e) => return Err(e),
            SetupAction::Transmit(bytes) => bytes.len().min(req.length as usize),
            SetupAction::Receive(_) => {
                self.state = self.state.transition(TransferEvent::Cancel);
                return Err(RequestError::WrongDirection(req.request));
            }
        };

        self.data_complete(len);
        self.ack(req);
        Ok(&self.readings.as_bytes()[..len])
    }

    /// Zero the pixel buffer and push it to the strip
    pub fn blank(&mut self) {
        self.pixels.clear();
        self.render();
    }

    fn render(&mut self) {
        self.pixels.render(&mut self.strip);
        self.stats.frames_rendered = self.stats.frames_rendered.wrapping_add(1);
    }

    fn sample(&mut self) {
        let report = self.readings.sample(&mut self.bus, &self.addresses);

        self.stats.samples = self.stats.samples.wrapping_add(1);
        self.stats.sensor_failures = self
            .stats
            .sensor_failures
            .wrapping_add(report.failure_count());
        self.last_report = report;
    }

    pub fn pixels(&self) -> &PixelBuffer<P> {
        &self.pixels
    }

    pub fn readings(&self) -> &TemperatureReadings<M> {
        &self.readings
    }

    pub fn addresses(&self) -> &SensorAddresses<M> {
        &self.addresses
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn stats(&self) -> HandlerStats {
        self.stats
    }

    /// Outcome of the most recent sampling round
    pub fn last_report(&self) -> SampleReport {
        self.last_report
    }

    pub fn strip(&self) -> &W {
        &self.strip
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Direct bus access, for sensor setup before the first request
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::tests::RecordingStrip;
    use crate::readings::tests::ScriptedBus;
    use crate::traits::SensorError;
    use proptest::prelude::*;
    use std::vec::Vec;
    use stripsense_protocol::{Direction, RequestType, REQ_GET_TEMPERATURE, REQ_SET_LED};

    type Handler<const P: usize> = ProtocolHandler<ScriptedBus, RecordingStrip, P, 4>;

    fn sensors() -> ScriptedBus {
        ScriptedBus::new(&[
            (0x48, Ok(20.0)),
            (0x49, Ok(21.5)),
            (0x4A, Ok(-3.0625)),
            (0x4B, Ok(25.0)),
        ])
    }

    fn handler<const P: usize>(bus: ScriptedBus) -> Handler<P> {
        let addresses = SensorAddresses::new([0x48, 0x49, 0x4A, 0x4B]).unwrap();
        ProtocolHandler::new(bus, RecordingStrip::default(), addresses)
    }

    fn set_led(len: u16) -> ControlRequest {
        ControlRequest::vendor(Direction::HostToDevice, REQ_SET_LED, len)
    }

    fn get_temperature() -> ControlRequest {
        ControlRequest::vendor(Direction::DeviceToHost, REQ_GET_TEMPERATURE, 16)
    }

    fn expected_words(payload: &[u8]) -> Vec<u32> {
        payload
            .chunks_exact(3)
            .map(|p| (p[1] as u32) << 16 | (p[0] as u32) << 8 | p[2] as u32)
            .collect()
    }

    #[test]
    fn test_two_pixel_scenario() {
        let mut h = handler::<2>(sensors());
        let rendered = h
            .control_out(&set_led(6), &[0x10, 0x20, 0x30, 0x01, 0x02, 0x03])
            .unwrap();

        assert!(rendered);
        assert_eq!(h.strip().words, [0x201030, 0x020103]);
        assert_eq!(h.stats().frames_rendered, 1);
        assert_eq!(h.state(), TransferState::Idle);
    }

    #[test]
    fn test_set_led_renders_only_on_ack() {
        let mut h = handler::<2>(sensors());
        let req = set_led(6);

        match h.setup(&req) {
            SetupAction::Receive(buf) => {
                assert_eq!(buf.len(), 6);
                buf.copy_from_slice(&[1, 2, 3, 4, 5, 6]);
            }
            other => panic!("expected Receive, got {:?}", other),
        }
        assert!(h.strip().words.is_empty());

        h.data_complete(6);
        assert_eq!(h.state(), TransferState::Complete(VendorRequest::SetLed));
        assert!(h.strip().words.is_empty());

        assert!(h.ack(&req));
        assert_eq!(h.strip().words, [0x020103, 0x050406]);
    }

    #[test]
    fn test_ack_without_data_does_not_render() {
        let mut h = handler::<2>(sensors());
        let req = set_led(6);

        assert!(matches!(h.setup(&req), SetupAction::Receive(_)));
        assert!(!h.ack(&req));

        assert!(h.strip().words.is_empty());
        assert_eq!(h.state(), TransferState::Idle);
    }

    #[test]
    fn test_zero_payload_renders_zero_words() {
        let mut h = handler::<8>(sensors());
        h.control_out(&set_led(24), &[0u8; 24]).unwrap();

        assert_eq!(h.strip().words.len(), 8);
        assert!(h.strip().words.iter().all(|&w| w == 0));
    }

    #[test]
    fn test_short_data_stage_counted_and_rendered() {
        let mut h = handler::<2>(sensors());
        h.control_out(&set_led(6), &[1, 2, 3, 4, 5, 6]).unwrap();

        let rendered = h.control_out(&set_led(3), &[9, 9, 9]).unwrap();

        assert!(rendered);
        assert_eq!(h.stats().short_data_stages, 1);
        assert_eq!(h.pixels().as_bytes(), &[9, 9, 9, 4, 5, 6]);
        assert_eq!(&h.strip().words[2..], &[0x090909, 0x050406]);
    }

    #[test]
    fn test_oversized_data_stage_is_truncated() {
        let mut h = handler::<2>(sensors());
        let rendered = h
            .control_out(&set_led(9), &[1, 2, 3, 4, 5, 6, 7, 8, 9])
            .unwrap();

        assert!(rendered);
        assert_eq!(h.stats().short_data_stages, 0);
        assert_eq!(h.pixels().as_bytes(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(h.strip().words, [0x020103, 0x050406]);
    }

    #[test]
    fn test_get_temperature_payload() {
        let mut h = handler::<2>(sensors());
        let payload = h.control_in(&get_temperature()).unwrap();

        assert_eq!(payload.len(), 16);
        assert_eq!(&payload[0..4], &20.0f32.to_le_bytes());
        assert_eq!(&payload[4..8], &21.5f32.to_le_bytes());
        assert_eq!(&payload[8..12], &(-3.0625f32).to_le_bytes());
        assert_eq!(&payload[12..16], &25.0f32.to_le_bytes());

        assert_eq!(h.stats().samples, 1);
        assert!(h.strip().words.is_empty());
        assert_eq!(h.state(), TransferState::Idle);
    }

    #[test]
    fn test_get_temperature_samples_at_setup() {
        let mut h = handler::<2>(sensors());

        match h.setup(&get_temperature()) {
            SetupAction::Transmit(bytes) => assert_eq!(bytes.len(), 16),
            other => panic!("expected Transmit, got {:?}", other),
        }
        // All sensors read before the data stage is armed
        assert_eq!(h.bus().reads, [0x48, 0x49, 0x4A, 0x4B]);

        h.data_complete(16);
        assert!(!h.ack(&get_temperature()));
        assert_eq!(h.bus().reads.len(), 4);
    }

    #[test]
    fn test_get_temperature_reads_every_sensor_every_time() {
        let mut h = handler::<2>(sensors());

        // Leave a SET_LED transfer hanging before each request
        for round in 1..=3 {
            assert!(matches!(h.setup(&set_led(6)), SetupAction::Receive(_)));
            h.control_in(&get_temperature()).unwrap();
            assert_eq!(h.bus().reads.len(), 4 * round);
        }

        assert_eq!(
            &h.bus().reads[8..],
            &[0x48, 0x49, 0x4A, 0x4B]
        );
        assert!(h.strip().words.is_empty());
    }

    #[test]
    fn test_get_temperature_idempotent() {
        let mut h = handler::<2>(sensors());

        let mut first = [0u8; 16];
        first.copy_from_slice(h.control_in(&get_temperature()).unwrap());
        let second = h.control_in(&get_temperature()).unwrap();

        assert_eq!(second, &first);
    }

    #[test]
    fn test_get_temperature_truncated_to_length() {
        let mut h = handler::<2>(sensors());
        let req = ControlRequest::vendor(Direction::DeviceToHost, REQ_GET_TEMPERATURE, 8);

        let payload = h.control_in(&req).unwrap();
        assert_eq!(payload, &[20.0f32.to_le_bytes(), 21.5f32.to_le_bytes()].concat()[..]);
        assert_eq!(h.stats().short_data_stages, 1);
        // Still a full sampling round
        assert_eq!(h.bus().reads.len(), 4);
    }

    #[test]
    fn test_sensor_failure_absorbed() {
        let mut bus = sensors();
        bus.sensors[2].1 = Err(SensorError::Bus);
        let mut h = handler::<2>(bus);

        let payload = h.control_in(&get_temperature()).unwrap();

        // Never read successfully: still the initial value
        assert_eq!(&payload[8..12], &0.0f32.to_le_bytes());
        assert_eq!(&payload[12..16], &25.0f32.to_le_bytes());
        assert!(h.last_report().sensor_failed(2));
        assert_eq!(h.stats().sensor_failures, 1);
    }

    #[test]
    fn test_unsupported_code_rejected() {
        let mut h = handler::<2>(sensors());
        let req = ControlRequest::vendor(Direction::HostToDevice, 0x03, 6);

        assert_eq!(
            h.setup(&req),
            SetupAction::Reject(RequestError::UnsupportedRequest(0x03))
        );
        assert!(!h.ack(&req));
        assert_eq!(h.stats().rejected, 1);
        assert!(h.strip().words.is_empty());
        assert!(h.bus().reads.is_empty());
    }

    #[test]
    fn test_wrong_direction_rejected() {
        let mut h = handler::<2>(sensors());
        let req = ControlRequest::vendor(Direction::DeviceToHost, REQ_SET_LED, 6);

        assert_eq!(
            h.control_in(&req),
            Err(RequestError::WrongDirection(REQ_SET_LED))
        );
        assert_eq!(h.stats().rejected, 1);
        assert_eq!(h.state(), TransferState::Idle);
    }

    #[test]
    fn test_non_vendor_ignored() {
        let mut h = handler::<2>(sensors());
        let mut req = set_led(6);
        req.request_type = RequestType::Standard;

        assert_eq!(h.setup(&req), SetupAction::Ignore);
        assert_eq!(h.control_out(&req, &[0xFF; 6]), Err(RequestError::NotVendor));
        assert!(!h.ack(&req));

        assert_eq!(h.stats(), HandlerStats::default());
        assert!(h.pixels().as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_non_vendor_setup_drops_pending_transfer() {
        let mut h = handler::<2>(sensors());
        let led = set_led(6);

        if let SetupAction::Receive(buf) = h.setup(&led) {
            buf.fill(0xFF);
        }
        h.data_complete(6);

        let mut standard = led;
        standard.request_type = RequestType::Standard;
        assert_eq!(h.setup(&standard), SetupAction::Ignore);

        assert!(!h.ack(&led));
        assert!(h.strip().words.is_empty());
    }

    #[test]
    fn test_blank() {
        let mut h = handler::<3>(sensors());
        h.control_out(&set_led(9), &[0xFF; 9]).unwrap();

        h.blank();

        assert_eq!(&h.strip().words[3..], &[0, 0, 0]);
        assert_eq!(h.stats().frames_rendered, 2);
    }

    proptest! {
        #[test]
        fn prop_set_led_renders_grb_as_rgb(payload in proptest::collection::vec(any::<u8>(), 48)) {
            let mut h = handler::<16>(sensors());
            prop_assert!(h.control_out(&set_led(48), &payload).unwrap());
            prop_assert_eq!(&h.strip().words, &expected_words(&payload));
        }

        #[test]
        fn prop_unsupported_code_never_mutates(
            code in any::<u8>().prop_filter("supported", |c| *c != REQ_SET_LED && *c != REQ_GET_TEMPERATURE),
            device_to_host: bool,
            data in proptest::collection::vec(any::<u8>(), 0..12),
        ) {
            let mut h = handler::<2>(sensors());
            h.control_out(&set_led(6), &[1, 2, 3, 4, 5, 6]).unwrap();
            h.control_in(&get_temperature()).unwrap();

            let pixels = h.pixels().clone();
            let readings = h.readings().clone();
            let frames = h.strip().words.len();
            let reads = h.bus().reads.len();

            let direction = if device_to_host {
                Direction::DeviceToHost
            } else {
                Direction::HostToDevice
            };
            let req = ControlRequest::vendor(direction, code, data.len() as u16);

            let err = if device_to_host {
                h.control_in(&req).unwrap_err()
            } else {
                h.control_out(&req, &data).unwrap_err()
            };

            prop_assert_eq!(err, RequestError::UnsupportedRequest(code));
            prop_assert_eq!(h.pixels(), &pixels);
            prop_assert_eq!(h.readings(), &readings);
            prop_assert_eq!(h.strip().words.len(), frames);
            prop_assert_eq!(h.bus().reads.len(), reads);
        }
    }
}
