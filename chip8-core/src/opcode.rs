use core::convert::TryFrom;
use core::fmt;

/// Decoded chip-8 instruction
///
/// Variant names spell the instruction word, with `X`/`Y` selecting
/// registers and `N`, `NN`, `NNN` being 4, 8 and 12 bit immediates. The
/// `0NNN` machine language call is not part of the set and fails to decode
/// like any other unknown word.
///
/// ```
/// use core::convert::TryFrom;
/// use chip8_core::opcode::{InvalidOpCode, OpCode};
///
/// assert_eq!(
///     OpCode::try_from(0xD12Fu16),
///     Ok(OpCode::_DXYN { x: 0x1, y: 0x2, n: 0xF }),
/// );
/// assert_eq!(OpCode::try_from(0x5231u16), Err(InvalidOpCode(0x5231)));
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OpCode {
    /// `CLS`
    _00E0,
    /// `RET`, resumes after the matching call
    _00EE,
    /// `PC = NNN`
    _1NNN { nnn: u16 },
    /// Call subroutine at NNN
    _2NNN { nnn: u16 },
    /// Skip if `VX == NN`
    _3XNN { x: u8, nn: u8 },
    /// Skip if `VX != NN`
    _4XNN { x: u8, nn: u8 },
    /// Skip if `VX == VY`
    _5XY0 { x: u8, y: u8 },
    /// `VX = NN`
    _6XNN { x: u8, nn: u8 },
    /// `VX += NN`, no carry flag
    _7XNN { x: u8, nn: u8 },
    /// `VX = VY`
    _8XY0 { x: u8, y: u8 },
    /// `VX |= VY`
    _8XY1 { x: u8, y: u8 },
    /// `VX &= VY`
    _8XY2 { x: u8, y: u8 },
    /// `VX ^= VY`
    _8XY3 { x: u8, y: u8 },
    /// `VX += VY`, VF is the carry
    _8XY4 { x: u8, y: u8 },
    /// `VX -= VY`, VF is set when VX was strictly greater
    _8XY5 { x: u8, y: u8 },
    /// `VX >>= 1`, VF is the bit shifted out
    _8XY6 { x: u8, y: u8 },
    /// `VX = VY - VX`, VF is set when VY was strictly greater
    _8XY7 { x: u8, y: u8 },
    /// `VX <<= 1`, VF is the bit shifted out
    _8XYE { x: u8, y: u8 },
    /// Skip if `VX != VY`
    _9XY0 { x: u8, y: u8 },
    /// `I = NNN`
    _ANNN { nnn: u16 },
    /// `PC = NNN + V0`
    _BNNN { nnn: u16 },
    /// `VX = rand() & NN`
    _CXNN { x: u8, nn: u8 },
    /// XOR N rows of sprite at I onto the screen at (VX, VY), VF reports collision
    _DXYN { x: u8, y: u8, n: u8 },
    /// Skip if key `VX` is down
    _EX9E { x: u8 },
    /// Skip if key `VX` is up
    _EXA1 { x: u8 },
    /// `VX = delay`
    _FX07 { x: u8 },
    /// Suspend until a key is pressed, `VX = key`
    _FX0A { x: u8 },
    /// `delay = VX`
    _FX15 { x: u8 },
    /// `sound = VX`
    _FX18 { x: u8 },
    /// `I += VX`
    _FX1E { x: u8 },
    /// `I` = address of font glyph for digit `VX`
    _FX29 { x: u8 },
    /// Decimal digits of VX to `I..I + 3`
    _FX33 { x: u8 },
    /// Dump `V0..=VX` to memory at I
    _FX55 { x: u8 },
    /// Load `V0..=VX` from memory at I
    _FX65 { x: u8 },
}

/// Instruction word which doesn't match any opcode
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct InvalidOpCode(pub u16);

impl fmt::Display for InvalidOpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operation code {:#06X}", self.0)
    }
}

/// Operand fields of an instruction word
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Fields {
    nibbles: (u8, u8, u8, u8),
    nn: u8,
    nnn: u16,
}

impl From<u16> for Fields {
    fn from(word: u16) -> Self {
        let nibble = |shift: u16| (word >> shift & 0xF) as u8;
        Self {
            nibbles: (nibble(12), nibble(8), nibble(4), nibble(0)),
            nn: (word & 0xFF) as u8,
            nnn: word & 0xFFF,
        }
    }
}

impl TryFrom<u16> for OpCode {
    type Error = InvalidOpCode;

    #[rustfmt::skip]
    fn try_from(word: u16) -> Result<Self, Self::Error> {
        use OpCode::*;

        let Fields { nibbles, nn, nnn } = Fields::from(word);
        let (_, x, y, n) = nibbles;
        let opcode = match nibbles {
            (0x0, 0x0, 0xE, 0x0) => _00E0,
            (0x0, 0x0, 0xE, 0xE) => _00EE,
            (0x1, _, _, _)       => _1NNN { nnn },
            (0x2, _, _, _)       => _2NNN { nnn },
            (0x3, _, _, _)       => _3XNN { x, nn },
            (0x4, _, _, _)       => _4XNN { x, nn },
            (0x5, _, _, 0x0)     => _5XY0 { x, y },
            (0x6, _, _, _)       => _6XNN { x, nn },
            (0x7, _, _, _)       => _7XNN { x, nn },
            (0x8, _, _, 0x0)     => _8XY0 { x, y },
            (0x8, _, _, 0x1)     => _8XY1 { x, y },
            (0x8, _, _, 0x2)     => _8XY2 { x, y },
            (0x8, _, _, 0x3)     => _8XY3 { x, y },
            (0x8, _, _, 0x4)     => _8XY4 { x, y },
            (0x8, _, _, 0x5)     => _8XY5 { x, y },
            (0x8, _, _, 0x6)     => _8XY6 { x, y },
            (0x8, _, _, 0x7)     => _8XY7 { x, y },
            (0x8, _, _, 0xE)     => _8XYE { x, y },
            (0x9, _, _, 0x0)     => _9XY0 { x, y },
            (0xA, _, _, _)       => _ANNN { nnn },
            (0xB, _, _, _)       => _BNNN { nnn },
            (0xC, _, _, _)       => _CXNN { x, nn },
            (0xD, _, _, _)       => _DXYN { x, y, n },
            (0xE, _, 0x9, 0xE)   => _EX9E { x },
            (0xE, _, 0xA, 0x1)   => _EXA1 { x },
            (0xF, _, 0x0, 0x7)   => _FX07 { x },
            (0xF, _, 0x0, 0xA)   => _FX0A { x },
            (0xF, _, 0x1, 0x5)   => _FX15 { x },
            (0xF, _, 0x1, 0x8)   => _FX18 { x },
            (0xF, _, 0x1, 0xE)   => _FX1E { x },
            (0xF, _, 0x2, 0x9)   => _FX29 { x },
            (0xF, _, 0x3, 0x3)   => _FX33 { x },
            (0xF, _, 0x5, 0x5)   => _FX55 { x },
            (0xF, _, 0x6, 0x5)   => _FX65 { x },
            _                    => return Err(InvalidOpCode(word)),
        };
        Ok(opcode)
    }
}
