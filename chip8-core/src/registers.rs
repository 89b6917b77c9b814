use heapless::{consts::U16, Vec};

use crate::error::Error;
use crate::memory::PROGRAM_START;

/// Depth of the call stack
pub const STACK_DEPTH: usize = 16;
/// Index of VF, the flag register
pub const VF: usize = 0xF;

/// Register file: V0-VF, index register, program counter and call stack
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registers {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    stack: Vec<u16, U16>,
}

impl Registers {
    pub fn new() -> Self {
        Self {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START as u16,
            stack: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Push return address, fails when all slots are taken
    pub fn push(&mut self, addr: u16) -> Result<(), Error> {
        self.stack.push(addr).map_err(|_| Error::StackOverflow)
    }

    pub fn pop(&mut self) -> Result<u16, Error> {
        self.stack.pop().ok_or(Error::StackUnderflow)
    }

    /// Number of return addresses on the stack
    pub fn stack_pointer(&self) -> usize {
        self.stack.len()
    }

    pub fn stack(&self) -> &[u16] {
        &self.stack
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
