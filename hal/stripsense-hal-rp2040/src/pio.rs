//! PIO bit timing for the WS2812 data line
//!
//! Each data bit takes a fixed number of PIO cycles split into three
//! phases:
//!
//! ```text
//!        T1      T2      T3
//!      ┌──────┬───────┐
//!  1:  │ high │ high  │  low
//!      ┘      └───────┘─────────
//!      ┌──────┐
//!  0:  │ high │  low     low
//!      ┘      └─────────────────
//! ```
//!
//! The bit rate is set entirely by the PIO clock divider.

/// Cycles the line is high for every bit
pub const T1: u8 = 2;
/// Cycles the line stays high for a 1 (low for a 0)
pub const T2: u8 = 5;
/// Cycles the line is low for every bit
pub const T3: u8 = 3;

/// PIO cycles per data bit
pub const CYCLES_PER_BIT: u32 = (T1 + T2 + T3) as u32;

/// Bits shifted out per pixel
pub const BITS_PER_PIXEL: u8 = 24;

/// Calculate the clock divider for a target bit rate
///
/// The PIO program runs at `sys_clk_hz / divider` and spends
/// [`CYCLES_PER_BIT`] cycles per bit, so:
///
/// divider = sys_clk_hz / (bit_rate_hz * CYCLES_PER_BIT)
///
/// Returns (integer_part, fractional_part) for the 16.8 fixed-point divider.
pub fn calc_clock_divider(sys_clk_hz: u32, bit_rate_hz: u32) -> (u16, u8) {
    if bit_rate_hz == 0 {
        return (0xFFFF, 0xFF); // Maximum divider = slowest possible
    }

    // To get 8-bit fractional precision, multiply by 256 first
    let divisor = bit_rate_hz as u64 * CYCLES_PER_BIT as u64;
    let divider_x256 = (sys_clk_hz as u64 * 256) / divisor;

    let int_part = (divider_x256 / 256).min(0xFFFF) as u16;
    let frac_part = (divider_x256 % 256) as u8;

    // Divider below 1.0 is not valid; run at full speed instead
    if int_part == 0 {
        return (1, 0);
    }

    (int_part, frac_part)
}

/// Pack a 16.8 divider into the register layout (integer in bits 8..24)
pub fn divider_bits(int_part: u16, frac_part: u8) -> u32 {
    ((int_part as u32) << 8) | frac_part as u32
}

/// Time to shift out `pixels` pixels at `bit_rate_hz`, in microseconds
pub fn frame_time_us(pixels: u32, bit_rate_hz: u32) -> u32 {
    if bit_rate_hz == 0 {
        return u32::MAX;
    }
    let bits = pixels as u64 * BITS_PER_PIXEL as u64;
    (bits * 1_000_000 / bit_rate_hz as u64).min(u32::MAX as u64) as u32
}
