//! PIO-based WS2812 data line
//!
//! One state machine runs the classic 3-instruction WS2812 program with
//! the data pin on side-set. Autopull takes 24 bits from the top of each
//! FIFO word, so a pixel's color must sit in bits 8..32.

use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, FifoJoin, Instance, PioPin, ShiftConfig,
    ShiftDirection, StateMachine,
};
use embassy_rp::Peri;
use fixed::types::U24F8;
use stripsense_hal::pixel::PixelSink;

use crate::pio::{calc_clock_divider, divider_bits, BITS_PER_PIXEL};

/// WS2812 strip driven by a PIO state machine
pub struct PioWs2812<'d, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
}

impl<'d, PIO: Instance, const SM: usize> PioWs2812<'d, PIO, SM> {
    /// Load the program, claim `pin` and start the state machine
    ///
    /// # Arguments
    /// * `common` - PIO common resources (for loading program)
    /// * `sm` - State machine to use
    /// * `pin` - Strip data pin
    /// * `bit_rate_hz` - Strip bit rate, 800 kHz for WS2812B
    pub fn new<P: PioPin>(
        common: &mut Common<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        pin: Peri<'d, P>,
        bit_rate_hz: u32,
    ) -> Self {
        // T3 = 3, T1 = 2, T2 = 5 (see crate::pio)
        let prg = pio::pio_asm!(
            ".side_set 1",
            ".wrap_target",
            "bitloop:",
            "out x, 1       side 0 [2]", // T3: shift next bit, line low
            "jmp !x do_zero side 1 [1]", // T1: line high for every bit
            "jmp bitloop    side 1 [4]", // T2: a 1 stays high
            "do_zero:",
            "nop            side 0 [4]", // T2: a 0 goes low
            ".wrap"
        );

        let installed = common.load_program(&prg.program);
        let out_pin = common.make_pio_pin(pin);

        let mut cfg = Config::default();
        cfg.use_program(&installed, &[&out_pin]);

        let (int_div, frac_div) = calc_clock_divider(clk_sys_freq(), bit_rate_hz);
        cfg.clock_divider = U24F8::from_bits(divider_bits(int_div, frac_div));

        cfg.fifo_join = FifoJoin::TxOnly;
        cfg.shift_out = ShiftConfig {
            auto_fill: true,
            threshold: BITS_PER_PIXEL,
            direction: ShiftDirection::Left,
        };

        sm.set_config(&cfg);
        sm.set_pin_dirs(PioDirection::Out, &[&out_pin]);
        sm.set_enable(true);

        Self { sm }
    }
}

impl<PIO: Instance, const SM: usize> PixelSink for PioWs2812<'_, PIO, SM> {
    fn push_word(&mut self, word: u32) {
        // Spins for at most one pixel time once the FIFO is full
        while !self.sm.tx().try_push(word) {}
    }
}
