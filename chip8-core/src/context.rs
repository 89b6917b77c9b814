//! Context for accessing functionalities of platform that `Chip8` is
//! emulated on.
//!
//! Keys, timers and the framebuffer are plain state owned or borrowed by the
//! machine, the context only covers what the core can't produce by itself.

use crate::frame::FrameView;

/// Trait aggregating platform functionalities
pub trait Context {
    /// Generate random 8-bit number
    ///
    /// Called by `step` whenever requested by executing program
    fn gen_random(&mut self) -> u8;
    /// Draw current frame to the screen
    ///
    /// Called by `step` after each executed sprite draw. Hosts which prefer
    /// to poll `Chip8::frame` when `Step::draw_occurred` is set can keep
    /// the default.
    fn on_frame(&mut self, _frame: FrameView<'_>) {}
}
