use core::convert::TryFrom;

use log::{info, trace, warn};

use crate::context::Context;
use crate::error::Error;
use crate::frame::{Frame, FrameView};
use crate::keypad::Keypad;
use crate::memory::{Memory, GLYPH_SIZE, MEM_SIZE};
use crate::opcode::{InvalidOpCode, OpCode};
use crate::quirks::Quirks;
use crate::registers::{Registers, VF};
use crate::timer::Timers;

/// Outcome of a single executed instruction
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Step {
    /// Framebuffer changed and should be presented
    pub draw_occurred: bool,
}

/// How the program counter moves after an instruction
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Pc {
    Next,
    Skip,
    Jump(u16),
}

impl Pc {
    /// Jump target has to be an even address inside memory
    fn jump(addr: u16) -> Result<Self, Error> {
        if addr as usize >= MEM_SIZE {
            Err(Error::OutOfBounds {
                addr: addr as usize,
            })
        } else if addr % 2 != 0 {
            Err(Error::MisalignedJump { addr })
        } else {
            Ok(Pc::Jump(addr))
        }
    }

    fn skip_if(condition: bool) -> Self {
        if condition {
            Pc::Skip
        } else {
            Pc::Next
        }
    }
}

/// Chip-8 virtual machine
///
/// Owns all of the machine state except for timers, which are borrowed so
/// that a clock running on another thread can decrement them at 60 Hz.
pub struct Chip8<'t, C: Context> {
    ctx: C,
    quirks: Quirks,
    regs: Registers,
    memory: Memory,
    frame: Frame,
    keypad: Keypad,
    timers: &'t Timers,
}

impl<'t, C: Context> Chip8<'t, C> {
    pub fn new(ctx: C, timers: &'t Timers) -> Self {
        Self::with_quirks(ctx, timers, Quirks::default())
    }

    pub fn with_quirks(ctx: C, timers: &'t Timers, quirks: Quirks) -> Self {
        let mut chip = Self {
            ctx,
            quirks,
            regs: Registers::new(),
            memory: Memory::new(),
            frame: Frame::new(),
            keypad: Keypad::new(),
            timers,
        };
        chip.reset();
        chip
    }

    /// Bring whole machine to the power-on state, program has to be loaded again
    pub fn reset(&mut self) {
        self.regs.reset();
        self.memory.reset();
        self.frame.clear();
        self.keypad.reset();
        self.timers.reset();
        info!("machine reset");
    }

    /// Load program from slice of bytes to memory from 0x200 (_start address)
    pub fn load_program(&mut self, prog: &[u8]) -> Result<(), Error> {
        self.memory.load_program(prog)?;
        info!("loaded program of {} bytes", prog.len());
        Ok(())
    }

    /// Fetch, decode and execute a single instruction
    ///
    /// Returns `WouldBlock` while waiting for a key press (FX0A), program
    /// counter stays on the waiting instruction until a key arrives. A failed
    /// step leaves machine state untouched.
    pub fn step(&mut self) -> nb::Result<Step, Error> {
        let addr = self.regs.pc;
        let word = self.memory.read_word(addr as usize)?;
        let opcode = OpCode::try_from(word).map_err(|InvalidOpCode(word)| {
            warn!("unknown opcode {:#06X} at {:#05X}", word, addr);
            Error::UnknownOpCode { word, addr }
        })?;
        trace!("{:#05X}: {:#06X} {:?}", addr, word, opcode);

        self.regs.pc = match self.execute(opcode)? {
            Pc::Next => addr + 2,
            Pc::Skip => addr + 4,
            Pc::Jump(target) => target,
        };

        let draw_occurred = matches!(opcode, OpCode::_DXYN { .. });
        if draw_occurred {
            self.ctx.on_frame(self.frame.view());
        }
        Ok(Step { draw_occurred })
    }

    /// Report key transition observed by the host
    pub fn set_key(&mut self, key: u8, pressed: bool) -> Result<(), Error> {
        self.keypad.set_key(key, pressed)
    }

    /// Whether execution is suspended on FX0A
    pub fn is_waiting_for_key(&self) -> bool {
        self.keypad.is_waiting()
    }

    pub fn frame(&self) -> FrameView<'_> {
        self.frame.view()
    }

    pub fn timers(&self) -> &'t Timers {
        self.timers
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    pub fn context(&self) -> &C {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.ctx
    }
}

// OpCodes impls
impl<'t, C: Context> Chip8<'t, C> {
    #[rustfmt::skip]
    fn execute(&mut self, opcode: OpCode) -> nb::Result<Pc, Error> {
        match opcode {
            OpCode::_00E0             => self.clear_screen(),
            OpCode::_00EE             => self.subroutine_return(),
            OpCode::_1NNN { nnn }     => self.jump_to(nnn),
            OpCode::_2NNN { nnn }     => self.exec_subroutine_at(nnn),
            OpCode::_3XNN { x, nn }   => self.skip_if_vx_eq_nn(x, nn),
            OpCode::_4XNN { x, nn }   => self.skip_if_vx_ne_nn(x, nn),
            OpCode::_5XY0 { x, y }    => self.skip_if_vx_eq_vy(x, y),
            OpCode::_6XNN { x, nn }   => self.assign_vx_nn(x, nn),
            OpCode::_7XNN { x, nn }   => self.assign_add_vx_nn(x, nn),
            OpCode::_8XY0 { x, y }    => self.assign_vx_vy(x, y),
            OpCode::_8XY1 { x, y }    => self.assign_or_vx_vy(x, y),
            OpCode::_8XY2 { x, y }    => self.assign_and_vx_vy(x, y),
            OpCode::_8XY3 { x, y }    => self.assign_xor_vx_vy(x, y),
            OpCode::_8XY4 { x, y }    => self.assign_add_vx_vy(x, y),
            OpCode::_8XY5 { x, y }    => self.assign_sub_vx_vy(x, y),
            OpCode::_8XY6 { x, y }    => self.assign_vx_shifted_r(x, y),
            OpCode::_8XY7 { x, y }    => self.assign_vx_vy_sub_vx(x, y),
            OpCode::_8XYE { x, y }    => self.assign_vx_shifted_l(x, y),
            OpCode::_9XY0 { x, y }    => self.skip_if_vx_ne_vy(x, y),
            OpCode::_ANNN { nnn }     => self.assign_i_nnn(nnn),
            OpCode::_BNNN { nnn }     => self.jump_to_nnn_add_v0(nnn),
            OpCode::_CXNN { x, nn }   => self.assign_vx_random_and_nn(x, nn),
            OpCode::_DXYN { x, y, n } => self.draw_n_at_vx_vy(x, y, n),
            OpCode::_EX9E { x }       => self.skip_if_vx_in_keys(x),
            OpCode::_EXA1 { x }       => self.skip_if_vx_not_in_keys(x),
            OpCode::_FX07 { x }       => self.assign_vx_delay_t(x),
            OpCode::_FX0A { x }       => return self.assign_vx_wait_for_key(x),
            OpCode::_FX15 { x }       => self.assign_delay_t_vx(x),
            OpCode::_FX18 { x }       => self.assign_sound_t_vx(x),
            OpCode::_FX1E { x }       => self.assign_add_i_vx(x),
            OpCode::_FX29 { x }       => self.assign_i_addr_of_sprite_vx(x),
            OpCode::_FX33 { x }       => self.assign_mem_at_i_bcd_of_vx(x),
            OpCode::_FX55 { x }       => self.assign_mem_at_i_v0_to_vx(x),
            OpCode::_FX65 { x }       => self.assign_v0_to_vx_mem_at_i(x),
        }
        .map_err(nb::Error::Other)
    }

    fn vx(&self, x: u8) -> u8 {
        self.regs.v[x as usize]
    }

    /// Clear the screen
    /// 00E0,
    fn clear_screen(&mut self) -> Result<Pc, Error> {
        self.frame.clear();
        Ok(Pc::Next)
    }

    /// Return from a subroutine
    /// 00EE,
    fn subroutine_return(&mut self) -> Result<Pc, Error> {
        self.regs.pop().map(|addr| Pc::Jump(addr + 2))
    }

    /// Jump to address NNN
    /// 1NNN { nnn: u16 },
    fn jump_to(&mut self, nnn: u16) -> Result<Pc, Error> {
        Pc::jump(nnn)
    }

    /// Execute subroutine starting at address NNN
    /// 2NNN { nnn: u16 },
    fn exec_subroutine_at(&mut self, nnn: u16) -> Result<Pc, Error> {
        let target = Pc::jump(nnn)?;
        self.regs.push(self.regs.pc)?;
        Ok(target)
    }

    /// Skip the following instruction if the value of register VX equals NN
    /// 3XNN { x: u8, nn: u8 },
    fn skip_if_vx_eq_nn(&mut self, x: u8, nn: u8) -> Result<Pc, Error> {
        Ok(Pc::skip_if(self.vx(x) == nn))
    }

    /// Skip the following instruction if the value of register VX is not equal to NN
    /// 4XNN { x: u8, nn: u8 },
    fn skip_if_vx_ne_nn(&mut self, x: u8, nn: u8) -> Result<Pc, Error> {
        Ok(Pc::skip_if(self.vx(x) != nn))
    }

    /// Skip the following instruction if the value of register VX is equal to the value of register VY
    /// 5XY0 { x: u8, y: u8 },
    fn skip_if_vx_eq_vy(&mut self, x: u8, y: u8) -> Result<Pc, Error> {
        Ok(Pc::skip_if(self.vx(x) == self.vx(y)))
    }

    /// Store number NN in register VX
    /// 6XNN { x: u8, nn: u8 },
    fn assign_vx_nn(&mut self, x: u8, nn: u8) -> Result<Pc, Error> {
        self.regs.v[x as usize] = nn;
        Ok(Pc::Next)
    }

    /// Add the value NN to register VX
    /// 7XNN { x: u8, nn: u8 },
    fn assign_add_vx_nn(&mut self, x: u8, nn: u8) -> Result<Pc, Error> {
        self.regs.v[x as usize] = self.vx(x).wrapping_add(nn);
        Ok(Pc::Next)
    }

    /// Store the value of register VY in register VX
    /// 8XY0 { x: u8, y: u8 },
    fn assign_vx_vy(&mut self, x: u8, y: u8) -> Result<Pc, Error> {
        self.regs.v[x as usize] = self.vx(y);
        Ok(Pc::Next)
    }

    /// Set VX to VX OR VY
    /// 8XY1 { x: u8, y: u8 },
    fn assign_or_vx_vy(&mut self, x: u8, y: u8) -> Result<Pc, Error> {
        self.regs.v[x as usize] |= self.vx(y);
        Ok(Pc::Next)
    }

    /// Set VX to VX AND VY
    /// 8XY2 { x: u8, y: u8 },
    fn assign_and_vx_vy(&mut self, x: u8, y: u8) -> Result<Pc, Error> {
        self.regs.v[x as usize] &= self.vx(y);
        Ok(Pc::Next)
    }

    /// Set VX to VX XOR VY
    /// 8XY3 { x: u8, y: u8 },
    fn assign_xor_vx_vy(&mut self, x: u8, y: u8) -> Result<Pc, Error> {
        self.regs.v[x as usize] ^= self.vx(y);
        Ok(Pc::Next)
    }

    /// Add the value of register VY to register VX, Set VF to 01 if a carry occurs, Set VF to 00 if a carry does not occur
    /// 8XY4 { x: u8, y: u8 },
    fn assign_add_vx_vy(&mut self, x: u8, y: u8) -> Result<Pc, Error> {
        let (value, carry) = self.vx(x).overflowing_add(self.vx(y));
        self.regs.v[x as usize] = value;
        self.regs.v[VF] = carry as u8;
        Ok(Pc::Next)
    }

    /// Subtract the value of register VY from register VX, Set VF to 01 if VX was greater than VY, 00 otherwise
    /// 8XY5 { x: u8, y: u8 },
    fn assign_sub_vx_vy(&mut self, x: u8, y: u8) -> Result<Pc, Error> {
        let (vx, vy) = (self.vx(x), self.vx(y));
        self.regs.v[x as usize] = vx.wrapping_sub(vy);
        self.regs.v[VF] = (vx > vy) as u8;
        Ok(Pc::Next)
    }

    /// Shift VX right by one bit, Set register VF to the least significant bit prior to the shift
    /// 8XY6 { x: u8, y: u8 },
    fn assign_vx_shifted_r(&mut self, x: u8, y: u8) -> Result<Pc, Error> {
        let source = if self.quirks.shift_uses_vy {
            self.vx(y)
        } else {
            self.vx(x)
        };
        self.regs.v[x as usize] = source >> 1;
        self.regs.v[VF] = source & 1u8;
        Ok(Pc::Next)
    }

    /// Set register VX to the value of VY minus VX, Set VF to 01 if VY was greater than VX, 00 otherwise
    /// 8XY7 { x: u8, y: u8 },
    fn assign_vx_vy_sub_vx(&mut self, x: u8, y: u8) -> Result<Pc, Error> {
        let (vx, vy) = (self.vx(x), self.vx(y));
        self.regs.v[x as usize] = vy.wrapping_sub(vx);
        self.regs.v[VF] = (vy > vx) as u8;
        Ok(Pc::Next)
    }

    /// Shift VX left by one bit, Set register VF to the most significant bit prior to the shift
    /// 8XYE { x: u8, y: u8 },
    fn assign_vx_shifted_l(&mut self, x: u8, y: u8) -> Result<Pc, Error> {
        let source = if self.quirks.shift_uses_vy {
            self.vx(y)
        } else {
            self.vx(x)
        };
        self.regs.v[x as usize] = source.wrapping_shl(1);
        self.regs.v[VF] = source >> 7;
        Ok(Pc::Next)
    }

    /// Skip the following instruction if the value of register VX is not equal to the value of register VY
    /// 9XY0 { x: u8, y: u8 },
    fn skip_if_vx_ne_vy(&mut self, x: u8, y: u8) -> Result<Pc, Error> {
        Ok(Pc::skip_if(self.vx(x) != self.vx(y)))
    }

    /// Store memory address NNN in register I
    /// ANNN { nnn: u16 },
    fn assign_i_nnn(&mut self, nnn: u16) -> Result<Pc, Error> {
        self.regs.i = nnn;
        Ok(Pc::Next)
    }

    /// Jump to address NNN + V0
    /// BNNN { nnn: u16 },
    fn jump_to_nnn_add_v0(&mut self, nnn: u16) -> Result<Pc, Error> {
        let offset = if self.quirks.jump_uses_vx {
            self.vx((nnn >> 8) as u8)
        } else {
            self.vx(0)
        };
        Pc::jump(nnn + offset as u16)
    }

    /// Set VX to a random number with a mask of NN
    /// CXNN { x: u8, nn: u8 },
    fn assign_vx_random_and_nn(&mut self, x: u8, nn: u8) -> Result<Pc, Error> {
        self.regs.v[x as usize] = self.ctx.gen_random() & nn;
        Ok(Pc::Next)
    }

    /// Draw a sprite at position VX, VY with N bytes of sprite data starting at the address stored in I, Set VF to 01 if any set pixels are changed to unset, and 00 otherwise
    /// DXYN { x: u8, y: u8, n: u8 },
    fn draw_n_at_vx_vy(&mut self, x: u8, y: u8, n: u8) -> Result<Pc, Error> {
        let (px, py) = (self.vx(x) as usize, self.vx(y) as usize);
        let sprite = self.memory.slice(self.regs.i as usize, n as usize)?;
        let collision = self.frame.draw_sprite(px, py, sprite);
        self.regs.v[VF] = collision as u8;
        Ok(Pc::Next)
    }

    /// Skip the following instruction if the key corresponding to the hex value currently stored in register VX is pressed
    /// EX9E { x: u8 },
    fn skip_if_vx_in_keys(&mut self, x: u8) -> Result<Pc, Error> {
        Ok(Pc::skip_if(self.keypad.is_pressed(self.vx(x))))
    }

    /// Skip the following instruction if the key corresponding to the hex value currently stored in register VX is not pressed
    /// EXA1 { x: u8 },
    fn skip_if_vx_not_in_keys(&mut self, x: u8) -> Result<Pc, Error> {
        Ok(Pc::skip_if(!self.keypad.is_pressed(self.vx(x))))
    }

    /// Store the current value of the delay timer in register VX
    /// FX07 { x: u8 },
    fn assign_vx_delay_t(&mut self, x: u8) -> Result<Pc, Error> {
        self.regs.v[x as usize] = self.timers.delay();
        Ok(Pc::Next)
    }

    /// Wait for a keypress and store the result in register VX
    /// FX0A { x: u8 },
    fn assign_vx_wait_for_key(&mut self, x: u8) -> nb::Result<Pc, Error> {
        let key = match self.keypad.wait_for_any_key() {
            Ok(key) => key,
            Err(nb::Error::WouldBlock) => return Err(nb::Error::WouldBlock),
            Err(nb::Error::Other(never)) => match never {},
        };
        self.regs.v[x as usize] = key;
        Ok(Pc::Next)
    }

    /// Set the delay timer to the value of register VX
    /// FX15 { x: u8 },
    fn assign_delay_t_vx(&mut self, x: u8) -> Result<Pc, Error> {
        self.timers.set_delay(self.vx(x));
        Ok(Pc::Next)
    }

    /// Set the sound timer to the value of register VX
    /// FX18 { x: u8 },
    fn assign_sound_t_vx(&mut self, x: u8) -> Result<Pc, Error> {
        self.timers.set_sound(self.vx(x));
        Ok(Pc::Next)
    }

    /// Add the value stored in register VX to register I
    /// FX1E { x: u8 },
    fn assign_add_i_vx(&mut self, x: u8) -> Result<Pc, Error> {
        self.regs.i = self.regs.i.wrapping_add(self.vx(x) as u16);
        Ok(Pc::Next)
    }

    /// Set I to the memory address of the sprite data corresponding to the hexadecimal digit stored in register VX
    /// FX29 { x: u8 },
    fn assign_i_addr_of_sprite_vx(&mut self, x: u8) -> Result<Pc, Error> {
        self.regs.i = (self.vx(x) & 0x0F) as u16 * GLYPH_SIZE as u16;
        Ok(Pc::Next)
    }

    /// Store the binary-coded decimal equivalent of the value stored in register VX at addresses I, I+1, and I+2
    /// FX33 { x: u8 },
    fn assign_mem_at_i_bcd_of_vx(&mut self, x: u8) -> Result<Pc, Error> {
        let value = self.vx(x);
        self.memory
            .slice_mut(self.regs.i as usize, 3)?
            .copy_from_slice(&[value / 100u8, (value % 100) / 10u8, value % 10u8]);
        Ok(Pc::Next)
    }

    /// Store the values of registers V0 to VX inclusive in memory starting at address I
    /// FX55 { x: u8 },
    fn assign_mem_at_i_v0_to_vx(&mut self, x: u8) -> Result<Pc, Error> {
        let len = x as usize + 1;
        self.memory
            .slice_mut(self.regs.i as usize, len)?
            .copy_from_slice(&self.regs.v[..len]);
        if self.quirks.load_store_increments_i {
            self.regs.i += len as u16;
        }
        Ok(Pc::Next)
    }

    /// Fill registers V0 to VX inclusive with the values stored in memory starting at address I
    /// FX65 { x: u8 },
    fn assign_v0_to_vx_mem_at_i(&mut self, x: u8) -> Result<Pc, Error> {
        let len = x as usize + 1;
        let bytes = self.memory.slice(self.regs.i as usize, len)?;
        self.regs.v[..len].copy_from_slice(bytes);
        if self.quirks.load_store_increments_i {
            self.regs.i += len as u16;
        }
        Ok(Pc::Next)
    }
}
