//! GET_TEMPERATURE payload encoding
//!
//! The data stage carries one IEEE-754 single-precision value per sensor,
//! little-endian, in configured sensor order. No header, no count: the
//! host derives the sensor count from the transfer length.

use heapless::Vec;

/// Bytes per temperature reading on the wire
pub const BYTES_PER_READING: usize = 4;

/// Upper bound on sensors a payload may describe
pub const MAX_SENSORS: usize = 16;

/// Errors encoding or decoding a temperature payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadError {
    /// Output buffer cannot hold every reading
    BufferTooSmall,
    /// Payload length is not a multiple of the reading size
    Misaligned,
    /// More readings than [`MAX_SENSORS`]
    TooManySensors,
}

/// Write `readings` into `out` as little-endian `f32`s
///
/// Returns the number of bytes written.
pub fn encode_temperatures(readings: &[f32], out: &mut [u8]) -> Result<usize, PayloadError> {
    let len = readings.len() * BYTES_PER_READING;
    if out.len() < len {
        return Err(PayloadError::BufferTooSmall);
    }

    for (chunk, reading) in out.chunks_exact_mut(BYTES_PER_READING).zip(readings) {
        chunk.copy_from_slice(&reading.to_le_bytes());
    }

    Ok(len)
}

/// Parse a GET_TEMPERATURE data stage
pub fn decode_temperatures(payload: &[u8]) -> Result<Vec<f32, MAX_SENSORS>, PayloadError> {
    if payload.len() % BYTES_PER_READING != 0 {
        return Err(PayloadError::Misaligned);
    }

    let mut readings = Vec::new();
    for chunk in payload.chunks_exact(BYTES_PER_READING) {
        let bytes = [chunk[0], chunk[1], chunk[2], chunk[3]];
        readings
            .push(f32::from_le_bytes(bytes))
            .map_err(|_| PayloadError::TooManySensors)?;
    }

    Ok(readings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let mut out = [0u8; 8];
        let len = encode_temperatures(&[25.0, -1.5], &mut out).unwrap();

        assert_eq!(len, 8);
        assert_eq!(&out[..4], &25.0f32.to_le_bytes());
        assert_eq!(&out[4..], &(-1.5f32).to_le_bytes());
        // 25.0 = 0x41C80000
        assert_eq!(&out[..4], &[0x00, 0x00, 0xC8, 0x41]);
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut out = [0u8; 7];
        assert_eq!(
            encode_temperatures(&[1.0, 2.0], &mut out),
            Err(PayloadError::BufferTooSmall)
        );
    }

    #[test]
    fn test_decode() {
        let mut out = [0u8; 16];
        encode_temperatures(&[20.0, 21.5, 22.25, -3.0625], &mut out).unwrap();

        let readings = decode_temperatures(&out).unwrap();
        assert_eq!(readings.as_slice(), &[20.0f32, 21.5, 22.25, -3.0625]);
    }

    #[test]
    fn test_decode_misaligned() {
        assert_eq!(
            decode_temperatures(&[0u8; 6]),
            Err(PayloadError::Misaligned)
        );
    }

    #[test]
    fn test_decode_too_many() {
        let payload = [0u8; (MAX_SENSORS + 1) * BYTES_PER_READING];
        assert_eq!(
            decode_temperatures(&payload),
            Err(PayloadError::TooManySensors)
        );
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode_temperatures(&[]).unwrap().is_empty());
    }
}
