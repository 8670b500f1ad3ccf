//! Blocking I2C master for RP2040
//!
//! Wraps an embassy-rp I2C peripheral in blocking mode and maps its
//! errors onto the shared [`I2cError`].

use embassy_rp::i2c::{self, AbortReason, Blocking, I2c, Instance, SclPin, SdaPin};
use embassy_rp::Peri;
use stripsense_hal::i2c::{I2cBus, I2cConfig, I2cError};

fn bus_error(e: i2c::Error) -> I2cError {
    match e {
        i2c::Error::Abort(AbortReason::NoAcknowledge) => I2cError::Nack,
        i2c::Error::Abort(AbortReason::ArbitrationLoss) => I2cError::ArbitrationLost,
        i2c::Error::Abort(_) => I2cError::Bus,
        _ => I2cError::Other,
    }
}

/// Blocking I2C master
pub struct RpI2c<'d, T: Instance> {
    i2c: I2c<'d, T, Blocking>,
}

impl<'d, T: Instance> RpI2c<'d, T> {
    /// Claim the controller and its pins
    ///
    /// Internal pull-ups are enabled on both lines.
    pub fn new(
        peri: Peri<'d, T>,
        scl: Peri<'d, impl SclPin<T>>,
        sda: Peri<'d, impl SdaPin<T>>,
        config: I2cConfig,
    ) -> Self {
        let mut cfg = i2c::Config::default();
        cfg.frequency = config.frequency;
        cfg.sda_pullup = true;
        cfg.scl_pullup = true;

        Self {
            i2c: I2c::new_blocking(peri, scl, sda, cfg),
        }
    }
}

impl<T: Instance> I2cBus for RpI2c<'_, T> {
    type Error = I2cError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), I2cError> {
        self.i2c.blocking_write(address, data).map_err(bus_error)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), I2cError> {
        self.i2c.blocking_read(address, buf).map_err(bus_error)
    }
}
