use crate::error::Error;

pub const MEM_SIZE: usize = 4096;
/// First address of a loaded program, everything below is reserved
pub const PROGRAM_START: usize = 0x200;
pub const PROGRAM_CAPACITY: usize = MEM_SIZE - PROGRAM_START;
/// Bytes per built-in hexadecimal digit sprite
pub const GLYPH_SIZE: usize = 5;

/// Sprites for hexadecimal digits 0-F, placed at address 0
#[rustfmt::skip]
pub const FONT_SET: [u8; 16 * GLYPH_SIZE] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Byte addressable memory of the machine
///
/// Every access is bounds checked, addresses never wrap around.
#[derive(Clone)]
pub struct Memory([u8; MEM_SIZE]);

impl Memory {
    /// Zeroed memory with font set loaded
    pub fn new() -> Self {
        let mut memory = Self([0; MEM_SIZE]);
        memory.reset();
        memory
    }

    pub fn reset(&mut self) {
        self.0 = [0; MEM_SIZE];
        self.0[..FONT_SET.len()].copy_from_slice(&FONT_SET);
    }

    pub fn read(&self, addr: usize) -> Result<u8, Error> {
        self.0
            .get(addr)
            .copied()
            .ok_or(Error::OutOfBounds { addr })
    }

    pub fn write(&mut self, addr: usize, value: u8) -> Result<(), Error> {
        self.0
            .get_mut(addr)
            .map(|byte| *byte = value)
            .ok_or(Error::OutOfBounds { addr })
    }

    /// Big-endian instruction word stored at `addr` and `addr + 1`
    pub fn read_word(&self, addr: usize) -> Result<u16, Error> {
        let hi = self.read(addr)?;
        let lo = self.read(addr + 1)?;
        Ok(u16::from(hi) << 8 | u16::from(lo))
    }

    /// View `len` bytes starting at `addr`
    pub fn slice(&self, addr: usize, len: usize) -> Result<&[u8], Error> {
        let end = addr + len;
        if end > MEM_SIZE {
            return Err(Error::OutOfBounds {
                addr: addr.max(MEM_SIZE),
            });
        }
        Ok(&self.0[addr..end])
    }

    /// Mutably view `len` bytes starting at `addr`
    pub fn slice_mut(&mut self, addr: usize, len: usize) -> Result<&mut [u8], Error> {
        let end = addr + len;
        if end > MEM_SIZE {
            return Err(Error::OutOfBounds {
                addr: addr.max(MEM_SIZE),
            });
        }
        Ok(&mut self.0[addr..end])
    }

    /// Copy program to memory starting from 0x200 (_start address)
    ///
    /// Memory is left untouched when program doesn't fit.
    pub fn load_program(&mut self, prog: &[u8]) -> Result<(), Error> {
        if prog.len() > PROGRAM_CAPACITY {
            return Err(Error::ProgramTooLarge {
                len: prog.len(),
                capacity: PROGRAM_CAPACITY,
            });
        }
        self.0[PROGRAM_START..PROGRAM_START + prog.len()].copy_from_slice(prog);
        Ok(())
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.0
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_set_loaded_on_creation() {
        let memory = Memory::new();
        assert_eq!(&memory.as_raw()[..80], &FONT_SET[..]);
        assert!(memory.as_raw()[80..].iter().all(|&b| b == 0));
    }

    #[test]
    fn read_write_bounds() {
        let mut memory = Memory::new();
        memory.write(0xFFF, 0xAB).unwrap();
        assert_eq!(memory.read(0xFFF), Ok(0xAB));
        assert_eq!(memory.read(0x1000), Err(Error::OutOfBounds { addr: 0x1000 }));
        assert_eq!(
            memory.write(0x1000, 0),
            Err(Error::OutOfBounds { addr: 0x1000 })
        );
    }

    #[test]
    fn read_word_is_big_endian() {
        let mut memory = Memory::new();
        memory.load_program(&[0xDE, 0xAD]).unwrap();
        assert_eq!(memory.read_word(0x200), Ok(0xDEADu16));
        assert_eq!(
            memory.read_word(0xFFF),
            Err(Error::OutOfBounds { addr: 0x1000 })
        );
    }

    #[test]
    fn slices_are_bounds_checked() {
        let memory = Memory::new();
        assert_eq!(memory.slice(0, 5).unwrap(), &FONT_SET[..5]);
        assert_eq!(memory.slice(0xFFE, 2).unwrap().len(), 2);
        assert_eq!(
            memory.slice(0xFFE, 3),
            Err(Error::OutOfBounds { addr: 0x1000 })
        );
    }

    #[test]
    fn slice_reports_first_invalid_address() {
        let mut memory = Memory::new();
        assert_eq!(
            memory.slice(0x1100, 3),
            Err(Error::OutOfBounds { addr: 0x1100 })
        );
        assert_eq!(
            memory.slice_mut(0xFF0, 0x20).map(|s| s.len()),
            Err(Error::OutOfBounds { addr: 0x1000 })
        );
        assert_eq!(memory.slice(0x1000, 0), Ok(&[][..]));
    }

    #[test]
    fn load_program_at_start_address() {
        let mut memory = Memory::new();
        memory.load_program(&[1, 2, 3]).unwrap();
        assert_eq!(&memory.as_raw()[0x1FF..0x204], &[0u8, 1, 2, 3, 0]);

        let full = [0xEEu8; PROGRAM_CAPACITY];
        memory.load_program(&full).unwrap();
        assert_eq!(memory.read(0xFFF), Ok(0xEE));
    }

    #[test]
    fn oversized_program_leaves_memory_untouched() {
        let mut memory = Memory::new();
        memory.load_program(&[7; 4]).unwrap();
        let before = memory.clone();

        let too_big = [1u8; PROGRAM_CAPACITY + 1];
        assert_eq!(
            memory.load_program(&too_big),
            Err(Error::ProgramTooLarge {
                len: PROGRAM_CAPACITY + 1,
                capacity: PROGRAM_CAPACITY,
            })
        );
        assert_eq!(memory.as_raw(), before.as_raw());
    }

    #[test]
    fn reset_zeroes_and_reloads_font() {
        let mut memory = Memory::new();
        memory.write(0, 0).unwrap();
        memory.load_program(&[9; 16]).unwrap();
        memory.reset();
        assert_eq!(memory.as_raw(), Memory::new().as_raw());
    }
}
