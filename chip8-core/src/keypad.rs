use core::convert::Infallible;

use log::debug;

use crate::error::Error;

pub const KEYS: usize = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Wait {
    Idle,
    Armed,
    Pressed(u8),
}

/// State of the 4x4 hexadecimal keypad as reported by the host
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; KEYS],
    wait: Wait,
}

impl Keypad {
    pub fn new() -> Self {
        Self {
            keys: [false; KEYS],
            wait: Wait::Idle,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Record key transition, latches the key if a wait is pending
    pub fn set_key(&mut self, key: u8, pressed: bool) -> Result<(), Error> {
        let state = self
            .keys
            .get_mut(key as usize)
            .ok_or(Error::InvalidKey(key))?;
        let was_pressed = core::mem::replace(state, pressed);
        if pressed && !was_pressed && self.wait == Wait::Armed {
            debug!("key {:X} resolves pending wait", key);
            self.wait = Wait::Pressed(key);
        }
        Ok(())
    }

    /// Only the lowest nibble of `key` is taken into account
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys[(key & 0x0F) as usize]
    }

    pub fn is_waiting(&self) -> bool {
        self.wait == Wait::Armed
    }

    /// Wait for the next key press
    ///
    /// First call arms the latch. Returns `WouldBlock` until any key goes
    /// from released to pressed, then yields that key and disarms.
    pub fn wait_for_any_key(&mut self) -> nb::Result<u8, Infallible> {
        match self.wait {
            Wait::Idle => {
                debug!("waiting for key press");
                self.wait = Wait::Armed;
                Err(nb::Error::WouldBlock)
            }
            Wait::Armed => Err(nb::Error::WouldBlock),
            Wait::Pressed(key) => {
                self.wait = Wait::Idle;
                Ok(key)
            }
        }
    }
}

impl Default for Keypad {
    fn default() -> Self {
        Self::new()
    }
}
