//! Serial pixel output abstraction
//!
//! A pixel sink accepts one already-framed 32-bit word per LED and shifts it
//! out on the strip's data line. Bit timing and reset latching belong to the
//! implementation.

/// Blocking pixel data line
pub trait PixelSink {
    /// Push one framed word to the data line
    ///
    /// Blocks until the hardware has accepted the word. The word is sent
    /// most significant bit first; how many bits are shifted out is fixed
    /// by the implementation's framing.
    fn push_word(&mut self, word: u32);
}

impl<T: PixelSink + ?Sized> PixelSink for &mut T {
    fn push_word(&mut self, word: u32) {
        (**self).push_word(word)
    }
}
