//! WS2812 addressable LED strip
//!
//! The serial sink shifts 32-bit words out MSB first and the strip
//! consumes 24 bits per pixel, so each color sits in the top three bytes
//! of the word. The low byte is padding and never reaches the strip.

use stripsense_core::traits::PixelWriter;
use stripsense_hal::pixel::PixelSink;

/// Bit position of the color within a sink word
const COLOR_SHIFT: u32 = 8;

/// WS2812 strip on a serial pixel sink
pub struct Ws2812<S> {
    sink: S,
}

impl<S: PixelSink> Ws2812<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Sink word for a 24-bit color
    pub const fn frame_word(rgb: u32) -> u32 {
        rgb << COLOR_SHIFT
    }

    pub fn release(self) -> S {
        self.sink
    }
}

impl<S: PixelSink> PixelWriter for Ws2812<S> {
    fn render_pixel(&mut self, rgb: u32) {
        self.sink.push_word(Self::frame_word(rgb));
    }
}
