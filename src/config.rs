//! Behaviour switches for the interpreter.
//!
//! The original COSMAC VIP interpreter and later ones (CHIP-48, SUPER-CHIP)
//! disagree on a couple of instructions. Both readings are carried here so
//! either can be picked at run time.

/// 8XY6 / 8XYE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftQuirk {
    /// VX := VY, then shift VX (COSMAC VIP)
    Legacy,
    /// shift VX in place; VY is ignored
    #[default]
    Modern,
}

/// BNNN / BXNN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpOffsetQuirk {
    /// jump to NNN + V0 (COSMAC VIP)
    Legacy,
    /// jump to XNN + VX (CHIP-48)
    #[default]
    Modern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quirks {
    pub shift: ShiftQuirk,
    pub jump_offset: JumpOffsetQuirk,
}

impl Quirks {
    /// everything as the COSMAC VIP did it
    pub fn legacy() -> Self {
        Quirks {
            shift: ShiftQuirk::Legacy,
            jump_offset: JumpOffsetQuirk::Legacy,
        }
    }
}

/// What `step` does with an instruction word it can't decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownOpcodePolicy {
    /// report `EngineError::UnsupportedOpcode` and leave the machine untouched
    #[default]
    Halt,
    /// log a warning and carry on with the next instruction
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub quirks: Quirks,
    /// where the hex font is loaded; FX29 points into it
    pub font_addr: u16,
    pub unknown_opcodes: UnknownOpcodePolicy,
    /// fixed seed for CXNN, otherwise seeded from the OS
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            quirks: Quirks::default(),
            font_addr: 0x000,
            unknown_opcodes: UnknownOpcodePolicy::default(),
            seed: None,
        }
    }
}
