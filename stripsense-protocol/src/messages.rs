//! Control request model and vendor request codes
//!
//! A [`ControlRequest`] is the decoded 8-byte setup packet. Only requests
//! whose type is [`RequestType::Vendor`] are ever classified into a
//! [`VendorRequest`]; standard and class requests belong to the USB stack.

/// bRequest: replace the LED buffer and render it
pub const REQ_SET_LED: u8 = 0x01;
/// bRequest: sample every sensor and return the readings
pub const REQ_GET_TEMPERATURE: u8 = 0x02;

/// Size of a setup packet in bytes
pub const SETUP_PACKET_SIZE: usize = 8;

// bmRequestType bit fields
const DIRECTION_BIT: u8 = 0x80;
const TYPE_SHIFT: u8 = 5;
const TYPE_MASK: u8 = 0x03;
const RECIPIENT_MASK: u8 = 0x1F;

/// Data stage direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Host sends data to the device (OUT)
    HostToDevice,
    /// Device sends data to the host (IN)
    DeviceToHost,
}

/// Request type field of bmRequestType
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestType {
    Standard,
    Class,
    Vendor,
    Reserved,
}

/// Recipient field of bmRequestType
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Recipient {
    Device,
    Interface,
    Endpoint,
    Other,
    Reserved,
}

/// Decoded setup packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlRequest {
    pub direction: Direction,
    pub request_type: RequestType,
    pub recipient: Recipient,
    /// bRequest
    pub request: u8,
    /// wValue
    pub value: u16,
    /// wIndex
    pub index: u16,
    /// wLength - maximum data stage length requested by the host
    pub length: u16,
}

/// Why a request is not handled as a vendor request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// Not a vendor request; left to the USB stack
    NotVendor,
    /// Vendor request with an unknown bRequest code
    UnsupportedRequest(u8),
    /// Known code sent with the wrong data direction
    WrongDirection(u8),
}

impl RequestError {
    /// Returns true if the transfer must be declined (stalled)
    ///
    /// Non-vendor requests are not declined by this protocol, they are
    /// simply not ours.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, RequestError::NotVendor)
    }
}

/// Supported vendor requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VendorRequest {
    /// SET_LED (0x01), host→device
    SetLed,
    /// GET_TEMPERATURE (0x02), device→host
    GetTemperature,
}

impl VendorRequest {
    /// Wire value of bRequest
    pub fn code(self) -> u8 {
        match self {
            VendorRequest::SetLed => REQ_SET_LED,
            VendorRequest::GetTemperature => REQ_GET_TEMPERATURE,
        }
    }

    /// Look up a request by its bRequest code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            REQ_SET_LED => Some(VendorRequest::SetLed),
            REQ_GET_TEMPERATURE => Some(VendorRequest::GetTemperature),
            _ => None,
        }
    }

    /// Data stage direction required by this request
    pub fn direction(self) -> Direction {
        match self {
            VendorRequest::SetLed => Direction::HostToDevice,
            VendorRequest::GetTemperature => Direction::DeviceToHost,
        }
    }

    /// Classify a decoded setup packet
    pub fn classify(req: &ControlRequest) -> Result<Self, RequestError> {
        if req.request_type != RequestType::Vendor {
            return Err(RequestError::NotVendor);
        }

        let vendor =
            Self::from_code(req.request).ok_or(RequestError::UnsupportedRequest(req.request))?;

        if vendor.direction() != req.direction {
            return Err(RequestError::WrongDirection(req.request));
        }

        Ok(vendor)
    }
}

impl ControlRequest {
    /// Build a vendor request addressed to the device
    pub fn vendor(direction: Direction, request: u8, length: u16) -> Self {
        Self {
            direction,
            request_type: RequestType::Vendor,
            recipient: Recipient::Device,
            request,
            value: 0,
            index: 0,
            length,
        }
    }

    /// Decode an 8-byte setup packet (little-endian fields)
    pub fn parse(packet: &[u8; SETUP_PACKET_SIZE]) -> Self {
        let bm = packet[0];

        let direction = if bm & DIRECTION_BIT != 0 {
            Direction::DeviceToHost
        } else {
            Direction::HostToDevice
        };

        let request_type = match (bm >> TYPE_SHIFT) & TYPE_MASK {
            0 => RequestType::Standard,
            1 => RequestType::Class,
            2 => RequestType::Vendor,
            _ => RequestType::Reserved,
        };

        let recipient = match bm & RECIPIENT_MASK {
            0 => Recipient::Device,
            1 => Recipient::Interface,
            2 => Recipient::Endpoint,
            3 => Recipient::Other,
            _ => Recipient::Reserved,
        };

        Self {
            direction,
            request_type,
            recipient,
            request: packet[1],
            value: u16::from_le_bytes([packet[2], packet[3]]),
            index: u16::from_le_bytes([packet[4], packet[5]]),
            length: u16::from_le_bytes([packet[6], packet[7]]),
        }
    }

    /// Encode back into an 8-byte setup packet
    pub fn to_bytes(&self) -> [u8; SETUP_PACKET_SIZE] {
        let dir = match self.direction {
            Direction::HostToDevice => 0,
            Direction::DeviceToHost => DIRECTION_BIT,
        };
        let ty = match self.request_type {
            RequestType::Standard => 0,
            RequestType::Class => 1,
            RequestType::Vendor => 2,
            RequestType::Reserved => 3,
        };
        let recipient = match self.recipient {
            Recipient::Device => 0,
            Recipient::Interface => 1,
            Recipient::Endpoint => 2,
            Recipient::Other => 3,
            Recipient::Reserved => RECIPIENT_MASK,
        };

        let value = self.value.to_le_bytes();
        let index = self.index.to_le_bytes();
        let length = self.length.to_le_bytes();

        [
            dir | (ty << TYPE_SHIFT) | recipient,
            self.request,
            value[0],
            value[1],
            index[0],
            index[1],
            length[0],
            length[1],
        ]
    }

    /// Returns true if this is a vendor-defined request
    pub fn is_vendor(&self) -> bool {
        self.request_type == RequestType::Vendor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vendor_out() {
        // bmRequestType 0x40: host-to-device, vendor, device
        let packet = [0x40, REQ_SET_LED, 0x00, 0x00, 0x00, 0x00, 0x10, 0x02];
        let req = ControlRequest::parse(&packet);

        assert_eq!(req.direction, Direction::HostToDevice);
        assert_eq!(req.request_type, RequestType::Vendor);
        assert_eq!(req.recipient, Recipient::Device);
        assert_eq!(req.request, REQ_SET_LED);
        assert_eq!(req.length, 528);
    }

    #[test]
    fn test_parse_vendor_in() {
        // bmRequestType 0xC0: device-to-host, vendor, device
        let packet = [0xC0, REQ_GET_TEMPERATURE, 0x34, 0x12, 0x01, 0x00, 0x10, 0x00];
        let req = ControlRequest::parse(&packet);

        assert_eq!(req.direction, Direction::DeviceToHost);
        assert_eq!(req.request_type, RequestType::Vendor);
        assert_eq!(req.value, 0x1234);
        assert_eq!(req.index, 1);
        assert_eq!(req.length, 16);
    }

    #[test]
    fn test_parse_standard_get_descriptor() {
        let packet = [0x80, 0x06, 0x00, 0x01, 0x00, 0x00, 0x12, 0x00];
        let req = ControlRequest::parse(&packet);

        assert_eq!(req.request_type, RequestType::Standard);
        assert_eq!(
            VendorRequest::classify(&req),
            Err(RequestError::NotVendor)
        );
    }

    #[test]
    fn test_setup_packet_bytes() {
        let req = ControlRequest::vendor(Direction::DeviceToHost, REQ_GET_TEMPERATURE, 16);
        assert_eq!(
            req.to_bytes(),
            [0xC0, 0x02, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00]
        );
        assert_eq!(ControlRequest::parse(&req.to_bytes()), req);
    }

    #[test]
    fn test_classify_supported() {
        let set = ControlRequest::vendor(Direction::HostToDevice, REQ_SET_LED, 6);
        assert_eq!(VendorRequest::classify(&set), Ok(VendorRequest::SetLed));

        let get = ControlRequest::vendor(Direction::DeviceToHost, REQ_GET_TEMPERATURE, 16);
        assert_eq!(
            VendorRequest::classify(&get),
            Ok(VendorRequest::GetTemperature)
        );
    }

    #[test]
    fn test_classify_unsupported_code() {
        let req = ControlRequest::vendor(Direction::HostToDevice, 0x7F, 0);
        let err = VendorRequest::classify(&req).unwrap_err();
        assert_eq!(err, RequestError::UnsupportedRequest(0x7F));
        assert!(err.is_rejection());
    }

    #[test]
    fn test_classify_wrong_direction() {
        let req = ControlRequest::vendor(Direction::DeviceToHost, REQ_SET_LED, 6);
        let err = VendorRequest::classify(&req).unwrap_err();
        assert_eq!(err, RequestError::WrongDirection(REQ_SET_LED));
        assert!(err.is_rejection());
    }

    #[test]
    fn test_not_vendor_is_not_rejection() {
        assert!(!RequestError::NotVendor.is_rejection());
    }

    #[test]
    fn test_code_lookup() {
        for req in [VendorRequest::SetLed, VendorRequest::GetTemperature] {
            assert_eq!(VendorRequest::from_code(req.code()), Some(req));
        }
        assert_eq!(VendorRequest::from_code(0x00), None);
    }
}
