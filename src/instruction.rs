use crate::error::EngineError;
use std::fmt;

/// The fixed bit fields of a 16-bit instruction word. Every field is pulled
/// out regardless of which family the word belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub word: u16,
    /// top nibble; the operation family
    pub family: u8,
    pub x: u8,
    pub y: u8,
    pub n: u8,
    pub nn: u8,
    pub nnn: u16,
}

impl From<u16> for Opcode {
    fn from(word: u16) -> Self {
        Opcode {
            word,
            family: ((word & 0xF000) >> 12) as u8,
            x: ((word & 0x0F00) >> 8) as u8,
            y: ((word & 0x00F0) >> 4) as u8,
            n: (word & 0x000F) as u8,
            nn: (word & 0x00FF) as u8,
            nnn: word & 0x0FFF,
        }
    }
}

/// A decoded CHIP-8 instruction. Register operands are 4-bit indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    ClearScreen,
    Return,
    Jump(u16),
    Call(u16),
    SkipIfEqualsConstant(u8, u8),
    SkipIfNotEqualsConstant(u8, u8),
    SkipIfEquals(u8, u8),
    SkipIfNotEquals(u8, u8),
    SetConstant(u8, u8),
    AddConstant(u8, u8),
    Set(u8, u8),
    Or(u8, u8),
    And(u8, u8),
    Xor(u8, u8),
    Add(u8, u8),
    /// VX := VX - VY
    Sub(u8, u8),
    ShiftRight(u8, u8),
    /// VX := VY - VX
    SubReversed(u8, u8),
    ShiftLeft(u8, u8),
    SetIndex(u16),
    /// register X, and NNN (which includes X)
    JumpWithOffset(u8, u16),
    Random(u8, u8),
    /// VX, VY, height
    Draw(u8, u8, u8),
    SkipIfKeyDown(u8),
    SkipIfKeyUp(u8),
    GetDelayTimer(u8),
    WaitForKey(u8),
    SetDelayTimer(u8),
    SetSoundTimer(u8),
    AddToIndex(u8),
    SetIndexToGlyph(u8),
    StoreBcd(u8),
    Store(u8),
    Load(u8),
}

impl Instruction {
    /// decode an instruction word; `addr` is only used to report failures
    pub fn decode(word: u16, addr: u16) -> Result<Instruction, EngineError> {
        let Opcode {
            family,
            x,
            y,
            n,
            nn,
            nnn,
            ..
        } = Opcode::from(word);

        let instruction = match family {
            0x0 => match word {
                0x00E0 => Instruction::ClearScreen,
                0x00EE => Instruction::Return,
                _ => return Err(EngineError::UnsupportedOpcode { word, addr }),
            },
            0x1 => Instruction::Jump(nnn),
            0x2 => Instruction::Call(nnn),
            0x3 => Instruction::SkipIfEqualsConstant(x, nn),
            0x4 => Instruction::SkipIfNotEqualsConstant(x, nn),
            0x5 => Instruction::SkipIfEquals(x, y),
            0x6 => Instruction::SetConstant(x, nn),
            0x7 => Instruction::AddConstant(x, nn),
            0x8 => match n {
                0x0 => Instruction::Set(x, y),
                0x1 => Instruction::Or(x, y),
                0x2 => Instruction::And(x, y),
                0x3 => Instruction::Xor(x, y),
                0x4 => Instruction::Add(x, y),
                0x5 => Instruction::Sub(x, y),
                0x6 => Instruction::ShiftRight(x, y),
                0x7 => Instruction::SubReversed(x, y),
                0xE => Instruction::ShiftLeft(x, y),
                _ => return Err(EngineError::UnsupportedOpcode { word, addr }),
            },
            0x9 => Instruction::SkipIfNotEquals(x, y),
            0xA => Instruction::SetIndex(nnn),
            0xB => Instruction::JumpWithOffset(x, nnn),
            0xC => Instruction::Random(x, nn),
            0xD => Instruction::Draw(x, y, n),
            0xE => match nn {
                0x9E => Instruction::SkipIfKeyDown(x),
                0xA1 => Instruction::SkipIfKeyUp(x),
                _ => return Err(EngineError::UnsupportedOpcode { word, addr }),
            },
            0xF => match nn {
                0x07 => Instruction::GetDelayTimer(x),
                0x0A => Instruction::WaitForKey(x),
                0x15 => Instruction::SetDelayTimer(x),
                0x18 => Instruction::SetSoundTimer(x),
                0x1E => Instruction::AddToIndex(x),
                0x29 => Instruction::SetIndexToGlyph(x),
                0x33 => Instruction::StoreBcd(x),
                0x55 => Instruction::Store(x),
                0x65 => Instruction::Load(x),
                _ => return Err(EngineError::UnsupportedOpcode { word, addr }),
            },
            _ => return Err(EngineError::UnsupportedOpcode { word, addr }),
        };
        Ok(instruction)
    }
}

/// conventional assembler mnemonics, for tracing
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(a) => write!(f, "JP {:#05x}", a),
            Call(a) => write!(f, "CALL {:#05x}", a),
            SkipIfEqualsConstant(x, nn) => write!(f, "SE V{:X}, {:#04x}", x, nn),
            SkipIfNotEqualsConstant(x, nn) => write!(f, "SNE V{:X}, {:#04x}", x, nn),
            SkipIfEquals(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            SkipIfNotEquals(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            SetConstant(x, nn) => write!(f, "LD V{:X}, {:#04x}", x, nn),
            AddConstant(x, nn) => write!(f, "ADD V{:X}, {:#04x}", x, nn),
            Set(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            Add(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight(x, y) => write!(f, "SHR V{:X}, V{:X}", x, y),
            SubReversed(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft(x, y) => write!(f, "SHL V{:X}, V{:X}", x, y),
            SetIndex(a) => write!(f, "LD I, {:#05x}", a),
            JumpWithOffset(x, a) => write!(f, "JP V{:X}, {:#05x}", x, a),
            Random(x, nn) => write!(f, "RND V{:X}, {:#04x}", x, nn),
            Draw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipIfKeyDown(x) => write!(f, "SKP V{:X}", x),
            SkipIfKeyUp(x) => write!(f, "SKNP V{:X}", x),
            GetDelayTimer(x) => write!(f, "LD V{:X}, DT", x),
            WaitForKey(x) => write!(f, "LD V{:X}, K", x),
            SetDelayTimer(x) => write!(f, "LD DT, V{:X}", x),
            SetSoundTimer(x) => write!(f, "LD ST, V{:X}", x),
            AddToIndex(x) => write!(f, "ADD I, V{:X}", x),
            SetIndexToGlyph(x) => write!(f, "LD F, V{:X}", x),
            StoreBcd(x) => write!(f, "LD B, V{:X}", x),
            Store(x) => write!(f, "LD [I], V{:X}", x),
            Load(x) => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
