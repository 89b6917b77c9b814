use core::fmt;

/// Errors reported by the interpreter
///
/// Every error is raised before the failing operation mutates any state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Instruction word at `addr` matches no known opcode
    UnknownOpCode { word: u16, addr: u16 },
    /// Memory access or jump target outside of address space
    OutOfBounds { addr: usize },
    /// Jump or call to an odd address
    MisalignedJump { addr: u16 },
    /// Subroutine call with all 16 stack slots taken
    StackOverflow,
    /// Return without a matching call
    StackUnderflow,
    /// Program doesn't fit between 0x200 and the end of memory
    ProgramTooLarge { len: usize, capacity: usize },
    /// Key index reported by the host outside of 0x0..=0xF
    InvalidKey(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::UnknownOpCode { word, addr } => {
                write!(f, "unknown opcode {:#06X} at {:#05X}", word, addr)
            }
            Error::OutOfBounds { addr } => {
                write!(f, "address {:#X} is out of address space", addr)
            }
            Error::MisalignedJump { addr } => {
                write!(f, "jump target {:#05X} is not instruction aligned", addr)
            }
            Error::StackOverflow => write!(f, "cannot enter subroutine, stack is full"),
            Error::StackUnderflow => write!(f, "cannot return, not in subroutine"),
            Error::ProgramTooLarge { len, capacity } => write!(
                f,
                "program of {} bytes exceeds available {} bytes",
                len, capacity
            ),
            Error::InvalidKey(key) => write!(f, "key {:#X} is not on the keypad", key),
        }
    }
}
