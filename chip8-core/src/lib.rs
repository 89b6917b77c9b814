#![no_std]
//! Interpreter core of a chip-8 virtual machine.
//!
//! The core owns memory, registers, the call stack, the framebuffer and the
//! keypad latch. Delay and sound timers live in a separate [`Timers`] value
//! borrowed by the machine, so a host clock can tick them from another thread
//! while [`Chip8::step`] runs.

pub mod builder;
pub mod chip8;
pub mod context;
pub mod error;
pub mod frame;
pub mod keypad;
pub mod memory;
pub mod opcode;
pub mod quirks;
pub mod registers;
pub mod timer;

pub use builder::{BuildError, Builder};
pub use chip8::{Chip8, Step};
pub use context::Context;
pub use error::Error;
pub use frame::{Frame, FrameView, HEIGHT, WIDTH};
pub use keypad::Keypad;
pub use memory::Memory;
pub use opcode::OpCode;
pub use quirks::Quirks;
pub use registers::Registers;
pub use timer::{Cadence, TimerState, Timers, TIMER_HZ};

#[cfg(feature = "embedded-graphics")]
pub use embedded_graphics;
