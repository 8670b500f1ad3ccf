//! Temperature sensor bus trait

/// Errors that can occur reading a temperature sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Sensor did not acknowledge its address
    NotResponding,
    /// Bus transaction failed (arbitration, bus error, timeout)
    Bus,
}

/// A bus carrying one or more addressable temperature sensors
///
/// Takes `&mut self` because every read is a bus transaction.
pub trait TemperatureBus {
    /// Read the sensor at `address` in degrees Celsius
    ///
    /// Blocks for one bus transaction. The address is one of the configured
    /// sensor addresses; implementations do not validate it.
    fn read_temperature(&mut self, address: u8) -> Result<f32, SensorError>;
}

impl<T: TemperatureBus + ?Sized> TemperatureBus for &mut T {
    fn read_temperature(&mut self, address: u8) -> Result<f32, SensorError> {
        (**self).read_temperature(address)
    }
}
