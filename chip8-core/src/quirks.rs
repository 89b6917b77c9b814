//! Compatibility flags for programs written against other interpreters.
//!
//! Defaults follow the documented instruction semantics. Older programs,
//! mostly ones targeting the original COSMAC VIP interpreter or the later
//! SUPER-CHIP, rely on slightly different behaviour of a handful of opcodes.

/// Set of behaviour switches, all off by default
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Quirks {
    /// 8XY6 and 8XYE shift VY and store the result in VX
    pub shift_uses_vy: bool,
    /// FX55 and FX65 leave I pointing right after the last accessed byte
    pub load_store_increments_i: bool,
    /// BNNN jumps to NNN + VX, where X is the highest nibble of NNN
    pub jump_uses_vx: bool,
}

impl Quirks {
    /// Behaviour of the COSMAC VIP interpreter
    pub fn cosmac_vip() -> Self {
        Self {
            shift_uses_vy: true,
            load_store_increments_i: true,
            jump_uses_vx: false,
        }
    }

    /// Behaviour of SUPER-CHIP 1.1
    pub fn super_chip() -> Self {
        Self {
            shift_uses_vy: false,
            load_store_increments_i: false,
            jump_uses_vx: true,
        }
    }
}
