//! SET_LED payload construction
//!
//! A SET_LED data stage is the whole strip, three bytes per pixel in
//! green, red, blue order, pixel 0 first. The strip is folded into a
//! serpentine matrix: even columns run bottom-to-top, odd columns
//! top-to-bottom, and row 0 is the top row as seen by the user.
//!
//! ```text
//!   col:  0   1   2
//! row 0   7   8  23
//! row 1   6   9  22
//!  ...
//! row 7   0  15  16
//! ```

/// Bytes per pixel in the SET_LED payload
pub const BYTES_PER_PIXEL: usize = 3;

/// Errors building a SET_LED payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Row, column or pixel index outside the strip
    OutOfBounds,
    /// Buffer length does not match the layout's pixel count
    BufferSize,
}

/// 8-bit-per-channel color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// All channels off
    pub const OFF: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decode a wire triplet stored as (green, red, blue)
    pub const fn from_grb(triplet: [u8; BYTES_PER_PIXEL]) -> Self {
        Self {
            g: triplet[0],
            r: triplet[1],
            b: triplet[2],
        }
    }

    /// Encode as a wire triplet (green, red, blue)
    pub const fn to_grb(self) -> [u8; BYTES_PER_PIXEL] {
        [self.g, self.r, self.b]
    }

    /// 24-bit word with red in bits 16-23, green in 8-15, blue in 0-7
    pub const fn to_rgb_word(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// Serpentine LED matrix geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MatrixLayout {
    pub columns: u16,
    pub rows: u16,
}

impl MatrixLayout {
    pub const fn new(columns: u16, rows: u16) -> Self {
        Self { columns, rows }
    }

    /// Total number of pixels
    pub const fn pixel_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// SET_LED payload size for this layout
    pub const fn payload_len(&self) -> usize {
        self.pixel_count() * BYTES_PER_PIXEL
    }

    /// Strip index of the pixel at (row, col)
    pub fn led_index(&self, row: u16, col: u16) -> Option<usize> {
        if row >= self.rows || col >= self.columns {
            return None;
        }

        let base = col as usize * self.rows as usize;
        let offset = if col % 2 == 0 {
            // Runs upward: the top row is the last pixel of the column
            (self.rows - 1 - row) as usize
        } else {
            row as usize
        };

        Some(base + offset)
    }
}

/// Writes colors into a caller-owned SET_LED payload
pub struct FrameBuilder<'a> {
    layout: MatrixLayout,
    buf: &'a mut [u8],
}

impl<'a> FrameBuilder<'a> {
    /// Wrap a payload buffer; its length must match the layout exactly
    pub fn new(layout: MatrixLayout, buf: &'a mut [u8]) -> Result<Self, FrameError> {
        if buf.len() != layout.payload_len() {
            return Err(FrameError::BufferSize);
        }
        Ok(Self { layout, buf })
    }

    pub fn layout(&self) -> MatrixLayout {
        self.layout
    }

    /// Set a pixel by strip index
    pub fn set_index(&mut self, index: usize, color: Color) -> Result<(), FrameError> {
        if index >= self.layout.pixel_count() {
            return Err(FrameError::OutOfBounds);
        }

        let start = index * BYTES_PER_PIXEL;
        self.buf[start..start + BYTES_PER_PIXEL].copy_from_slice(&color.to_grb());
        Ok(())
    }

    /// Set a pixel by matrix position
    pub fn set(&mut self, row: u16, col: u16, color: Color) -> Result<(), FrameError> {
        let index = self
            .layout
            .led_index(row, col)
            .ok_or(FrameError::OutOfBounds)?;
        self.set_index(index, color)
    }

    /// Set every pixel to one color
    pub fn fill(&mut self, color: Color) {
        for slot in self.buf.chunks_exact_mut(BYTES_PER_PIXEL) {
            slot.copy_from_slice(&color.to_grb());
        }
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.buf.fill(0);
    }

    /// The finished payload
    pub fn as_bytes(&self) -> &[u8] {
        self.buf
    }
}
