//! LED strip pixel output trait

/// Pushes pixel colors onto an addressable LED strip, one at a time
pub trait PixelWriter {
    /// Emit the next pixel along the strip
    ///
    /// `rgb` holds red in bits 16-23, green in bits 8-15 and blue in bits
    /// 0-7; the top byte is zero. Blocks until the hardware accepts the
    /// color.
    fn render_pixel(&mut self, rgb: u32);
}

impl<T: PixelWriter + ?Sized> PixelWriter for &mut T {
    fn render_pixel(&mut self, rgb: u32) {
        (**self).render_pixel(rgb)
    }
}
