//! TMP102 digital temperature sensor (I2C)
//!
//! Every sensor on the bus shares one driver; the address selects the
//! device for each transaction.
//!
//! # Register read
//!
//! The TMP102 keeps a pointer register selecting which register a plain
//! read returns. It powers up pointing at the temperature register, so a
//! 2-byte read with no preceding write returns:
//!
//! ```text
//!   byte 0: T11 T10 T9 T8 T7 T6 T5 T4
//!   byte 1: T3  T2  T1 T0  0  0  0  0
//! ```
//!
//! a 12-bit two's complement value in units of 0.0625 °C.

use stripsense_core::traits::{SensorError, TemperatureBus};
use stripsense_hal::i2c::{I2cBus, I2cError};

/// TMP102 register addresses (pointer register values)
pub mod reg {
    /// Temperature, read-only
    pub const TEMPERATURE: u8 = 0x00;
    /// Configuration
    pub const CONFIG: u8 = 0x01;
    /// Low alert limit
    pub const T_LOW: u8 = 0x02;
    /// High alert limit
    pub const T_HIGH: u8 = 0x03;
}

/// Degrees Celsius per LSB of the 12-bit reading
pub const RESOLUTION_C: f32 = 0.0625;

/// Bytes in one register read
const READ_LEN: usize = 2;

/// Convert a raw temperature register pair to degrees Celsius
///
/// The arithmetic shift keeps the sign of sub-zero readings.
pub fn raw_to_celsius(raw: [u8; READ_LEN]) -> f32 {
    let counts = i16::from_be_bytes(raw) >> 4;
    counts as f32 * RESOLUTION_C
}

fn sensor_error(e: I2cError) -> SensorError {
    match e {
        I2cError::Nack => SensorError::NotResponding,
        _ => SensorError::Bus,
    }
}

/// All TMP102 sensors sharing one I2C bus
pub struct Tmp102Bus<I> {
    i2c: I,
}

impl<I: I2cBus> Tmp102Bus<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Point the sensor at `address` to its temperature register
    ///
    /// Called once per sensor at startup so later plain reads are known to
    /// return the temperature, whatever state the sensor was left in.
    pub fn select_temperature_register(&mut self, address: u8) -> Result<(), SensorError> {
        self.i2c
            .write(address, &[reg::TEMPERATURE])
            .map_err(|e| sensor_error(e.into()))
    }

    /// Read the register currently selected by the pointer
    pub fn read_raw(&mut self, address: u8) -> Result<[u8; READ_LEN], SensorError> {
        let mut buf = [0u8; READ_LEN];
        self.i2c
            .read(address, &mut buf)
            .map_err(|e| sensor_error(e.into()))?;
        Ok(buf)
    }

    /// Release the underlying bus
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2cBus> TemperatureBus for Tmp102Bus<I> {
    fn read_temperature(&mut self, address: u8) -> Result<f32, SensorError> {
        self.read_raw(address).map(raw_to_celsius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::vec::Vec;

    /// One recorded bus transaction
    #[derive(Debug, PartialEq)]
    enum Op {
        Write(u8, Vec<u8>),
        Read(u8, usize),
    }

    /// I2C double: fixed register contents per address
    struct MockI2c {
        devices: Vec<(u8, [u8; 2])>,
        fail_with: Option<I2cError>,
        ops: Vec<Op>,
    }

    impl MockI2c {
        fn new(devices: &[(u8, [u8; 2])]) -> Self {
            Self {
                devices: devices.to_vec(),
                fail_with: None,
                ops: Vec::new(),
            }
        }

        fn lookup(&self, address: u8) -> Result<[u8; 2], I2cError> {
            if let Some(e) = self.fail_with {
                return Err(e);
            }
            self.devices
                .iter()
                .find(|(a, _)| *a == address)
                .map(|(_, raw)| *raw)
                .ok_or(I2cError::Nack)
        }
    }

    impl I2cBus for MockI2c {
        type Error = I2cError;

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), I2cError> {
            self.ops.push(Op::Write(address, data.to_vec()));
            self.lookup(address).map(|_| ())
        }

        fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), I2cError> {
            self.ops.push(Op::Read(address, buf.len()));
            let raw = self.lookup(address)?;
            buf.copy_from_slice(&raw[..buf.len()]);
            Ok(())
        }
    }

    #[test]
    fn test_conversion_known_values() {
        // 0x190 counts
        assert_eq!(raw_to_celsius([0x19, 0x00]), 25.0);
        assert_eq!(raw_to_celsius([0x00, 0x00]), 0.0);
        assert_eq!(raw_to_celsius([0x00, 0x10]), 0.0625);
        assert_eq!(raw_to_celsius([0x7F, 0xF0]), 127.9375);
    }

    #[test]
    fn test_conversion_negative() {
        // Datasheet: 0xFFF = -0.0625, 0xE70 = -25
        assert_eq!(raw_to_celsius([0xFF, 0xF0]), -0.0625);
        assert_eq!(raw_to_celsius([0xE7, 0x00]), -25.0);
        assert_eq!(raw_to_celsius([0xC9, 0x00]), -55.0);
    }

    #[test]
    fn test_low_nibble_ignored() {
        assert_eq!(raw_to_celsius([0x19, 0x0F]), 25.0);
    }

    #[test]
    fn test_read_temperature() {
        let mut bus = Tmp102Bus::new(MockI2c::new(&[(0x48, [0x19, 0x00]), (0x49, [0xFF, 0xF0])]));

        assert_eq!(bus.read_temperature(0x48), Ok(25.0));
        assert_eq!(bus.read_temperature(0x49), Ok(-0.0625));

        // Plain 2-byte reads, no pointer write
        let i2c = bus.release();
        assert_eq!(i2c.ops, [Op::Read(0x48, 2), Op::Read(0x49, 2)]);
    }

    #[test]
    fn test_missing_sensor_not_responding() {
        let mut bus = Tmp102Bus::new(MockI2c::new(&[(0x48, [0x19, 0x00])]));
        assert_eq!(bus.read_temperature(0x4B), Err(SensorError::NotResponding));
    }

    #[test]
    fn test_bus_fault() {
        let mut i2c = MockI2c::new(&[(0x48, [0x19, 0x00])]);
        i2c.fail_with = Some(I2cError::ArbitrationLost);
        let mut bus = Tmp102Bus::new(i2c);

        assert_eq!(bus.read_temperature(0x48), Err(SensorError::Bus));
    }

    #[test]
    fn test_select_temperature_register() {
        let mut bus = Tmp102Bus::new(MockI2c::new(&[(0x48, [0x19, 0x00])]));

        assert_eq!(bus.select_temperature_register(0x48), Ok(()));
        assert_eq!(
            bus.select_temperature_register(0x4A),
            Err(SensorError::NotResponding)
        );

        let i2c = bus.release();
        assert_eq!(
            i2c.ops,
            [
                Op::Write(0x48, [reg::TEMPERATURE].to_vec()),
                Op::Write(0x4A, [reg::TEMPERATURE].to_vec()),
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_conversion_is_signed_12_bit(b0: u8, b1: u8) {
            let counts = ((b0 as i32) << 4) | ((b1 as i32) >> 4);
            let signed = if counts & 0x800 != 0 { counts - 0x1000 } else { counts };

            prop_assert_eq!(raw_to_celsius([b0, b1]), signed as f32 * 0.0625);
        }

        #[test]
        fn prop_conversion_in_sensor_range(b0: u8, b1: u8) {
            let celsius = raw_to_celsius([b0, b1]);
            prop_assert!((-128.0..128.0).contains(&celsius));
        }
    }
}
