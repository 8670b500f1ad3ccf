//! Sensor address set

use stripsense_protocol::MAX_SENSORS;

/// Lowest non-reserved 7-bit I2C address
pub const MIN_ADDRESS: u8 = 0x08;

/// Highest non-reserved 7-bit I2C address
pub const MAX_ADDRESS: u8 = 0x77;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No sensors configured
    NoSensors,
    /// More sensors than a GET_TEMPERATURE payload can carry
    TooManySensors,
    /// Address outside the 7-bit range or in a reserved block
    InvalidAddress(u8),
    /// Same address listed twice
    DuplicateAddress(u8),
}

/// Ordered, validated set of sensor bus addresses
///
/// The order defines both the sampling order and the order of readings in
/// the GET_TEMPERATURE response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorAddresses<const M: usize> {
    addresses: [u8; M],
}

impl<const M: usize> SensorAddresses<M> {
    /// Validate an address list
    ///
    /// `const` so a board definition can check its table at compile time.
    pub const fn new(addresses: [u8; M]) -> Result<Self, ConfigError> {
        if M == 0 {
            return Err(ConfigError::NoSensors);
        }
        if M > MAX_SENSORS {
            return Err(ConfigError::TooManySensors);
        }

        let mut i = 0;
        while i < M {
            let addr = addresses[i];
            if addr < MIN_ADDRESS || addr > MAX_ADDRESS {
                return Err(ConfigError::InvalidAddress(addr));
            }

            let mut j = 0;
            while j < i {
                if addresses[j] == addr {
                    return Err(ConfigError::DuplicateAddress(addr));
                }
                j += 1;
            }
            i += 1;
        }

        Ok(Self { addresses })
    }

    /// Number of sensors
    pub const fn len(&self) -> usize {
        M
    }

    /// Always false; an empty set fails validation
    pub const fn is_empty(&self) -> bool {
        M == 0
    }

    /// Address of sensor `index`
    pub fn get(&self, index: usize) -> Option<u8> {
        self.addresses.get(index).copied()
    }

    /// Addresses in sampling order
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.addresses.iter().copied()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.addresses
    }
}
