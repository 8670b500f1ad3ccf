//! Temperature readings and sensor sampling
//!
//! Readings are kept both as `f32` values and as their little-endian wire
//! image, so a GET_TEMPERATURE data stage can be armed straight from the
//! stored bytes.

use stripsense_protocol::{encode_temperatures, BYTES_PER_READING};

use crate::config::SensorAddresses;
use crate::traits::{SensorError, TemperatureBus};

/// Outcome of one sampling round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleReport {
    /// Bit `i` set if sensor `i` failed to read this round
    pub failed: u32,
    /// Last error seen this round, if any
    pub last_error: Option<SensorError>,
}

impl SampleReport {
    /// Returns true if every sensor read succeeded
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// Number of sensors that failed
    pub fn failure_count(&self) -> u32 {
        self.failed.count_ones()
    }

    /// Returns true if sensor `index` failed
    pub fn sensor_failed(&self, index: usize) -> bool {
        index < 32 && self.failed & (1 << index) != 0
    }
}

/// One reading per configured sensor, in address-set order
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureReadings<const M: usize> {
    values: [f32; M],
    wire: [[u8; BYTES_PER_READING]; M],
}

impl<const M: usize> Default for TemperatureReadings<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const M: usize> TemperatureReadings<M> {
    /// All readings start at 0.0 °C
    pub const fn new() -> Self {
        Self {
            values: [0.0; M],
            wire: [[0; BYTES_PER_READING]; M],
        }
    }

    /// Number of readings
    pub const fn len(&self) -> usize {
        M
    }

    pub const fn is_empty(&self) -> bool {
        M == 0
    }

    /// Reading for sensor `index` in degrees Celsius
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Wire image: `M` little-endian `f32`s
    pub fn as_bytes(&self) -> &[u8] {
        self.wire.as_flattened()
    }

    /// Read every sensor once, in address order
    ///
    /// A failed read leaves the previous value for that sensor in place and
    /// does not stop the round. Nothing is retried.
    pub fn sample<B: TemperatureBus>(
        &mut self,
        bus: &mut B,
        addresses: &SensorAddresses<M>,
    ) -> SampleReport {
        let mut report = SampleReport::default();

        for (index, address) in addresses.iter().enumerate() {
            match bus.read_temperature(address) {
                Ok(celsius) => self.values[index] = celsius,
                Err(e) => {
                    report.failed |= 1 << index;
                    report.last_error = Some(e);
                }
            }
        }

        // The image holds exactly M readings
        let written = encode_temperatures(&self.values, self.wire.as_flattened_mut());
        debug_assert_eq!(written, Ok(M * BYTES_PER_READING));

        report
    }
}
