//! Pixel buffer and frame rendering
//!
//! The buffer holds exactly `P` triplets in the host's wire order
//! (green, red, blue). Its byte view is what a SET_LED data stage is copied
//! into; rendering converts each triplet to the strip's RGB word.

use stripsense_protocol::{Color, BYTES_PER_PIXEL};

use crate::traits::PixelWriter;

/// Fixed-size LED color buffer in GRB wire order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer<const P: usize> {
    triplets: [[u8; BYTES_PER_PIXEL]; P],
}

impl<const P: usize> Default for PixelBuffer<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const P: usize> PixelBuffer<P> {
    /// Zero-initialized buffer (every pixel off)
    pub const fn new() -> Self {
        Self {
            triplets: [[0; BYTES_PER_PIXEL]; P],
        }
    }

    /// Number of pixels
    pub const fn pixel_count(&self) -> usize {
        P
    }

    /// Size in bytes of a full SET_LED payload
    pub const fn byte_len(&self) -> usize {
        P * BYTES_PER_PIXEL
    }

    /// Byte view, GRB per pixel
    pub fn as_bytes(&self) -> &[u8] {
        self.triplets.as_flattened()
    }

    /// Mutable byte view, the target of a SET_LED data stage
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.triplets.as_flattened_mut()
    }

    /// Copy a data stage into the buffer from pixel 0
    ///
    /// Bytes past the end of the buffer are dropped; a short payload leaves
    /// the tail untouched. Returns the number of bytes copied.
    pub fn load(&mut self, data: &[u8]) -> usize {
        let dst = self.as_bytes_mut();
        let len = data.len().min(dst.len());
        dst[..len].copy_from_slice(&data[..len]);
        len
    }

    /// Color of pixel `index`
    pub fn color(&self, index: usize) -> Option<Color> {
        self.triplets.get(index).map(|t| Color::from_grb(*t))
    }

    /// Colors in strip order
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.triplets.iter().map(|t| Color::from_grb(*t))
    }

    /// Set every pixel to zero
    pub fn clear(&mut self) {
        self.triplets = [[0; BYTES_PER_PIXEL]; P];
    }

    /// Emit the whole buffer, pixel 0 first
    ///
    /// Calls [`PixelWriter::render_pixel`] exactly `P` times.
    pub fn render<W: PixelWriter>(&self, strip: &mut W) {
        for color in self.colors() {
            strip.render_pixel(color.to_rgb_word());
        }
    }
}
