use crate::error::LoadError;
use log::{debug, error};

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the addressable memory of the machine
pub trait MemoryMap {
    /// write a chunk of bytes into "RAM"; all or nothing
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), LoadError> {
        match self.get_rw_slice(addr, data.len()) {
            Some(bytes) => {
                bytes.copy_from_slice(data);
                Ok(())
            }
            None => {
                error!(
                    "memory copy of {} bytes to {:#05x} out of bounds; skipped",
                    data.len(),
                    addr
                );
                Err(LoadError::OutOfBounds {
                    addr,
                    len: data.len(),
                })
            }
        }
    }

    /// get a two-byte big-endian word; the second byte wraps round to 0x000
    fn get_word(&self, addr: u16) -> u16 {
        ((self.get_byte(addr) as u16) << 8) | (self.get_byte(addr.wrapping_add(1)) as u16)
    }

    /// read a byte; the address wraps at the top of memory
    fn get_byte(&self, addr: u16) -> u8;

    /// write a byte; the address wraps at the top of memory
    fn set_byte(&mut self, addr: u16, value: u8);

    /// get a r/w slice of the underlying memory, or None if out of bounds
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Option<&mut [u8]>;

    /// get a r/o slice of the underlying memory, or None if out of bounds
    fn get_ro_slice(&self, addr: u16, len: usize) -> Option<&[u8]>;
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// biggest program that fits between the load address and the top of RAM
pub const CHIP8_MAX_PROGRAM_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// height of one font glyph in bytes
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// Defines the CHIP-8 standard memory map
///   0x0000-0x01ff  interpreter (font lives here)
///   0x0200-0x0fff  program
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
    pub font_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_byte(&self, addr: u16) -> u8 {
        self.bytes[addr as usize % CHIP8_RAM_SIZE_BYTES]
    }

    fn set_byte(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize % CHIP8_RAM_SIZE_BYTES] = value;
    }

    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Option<&mut [u8]> {
        let a = addr as usize;
        self.bytes.get_mut(a..a.checked_add(len)?)
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Option<&[u8]> {
        let a = addr as usize;
        self.bytes.get(a..a.checked_add(len)?)
    }
}

impl Chip8MemoryMap {
    /// zeroed memory with the font baked in at `font_addr`
    pub fn new(font_addr: u16) -> Result<Self, LoadError> {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
            program_addr: CHIP8_PROGRAM_ADDR,
            font_addr,
        };
        mm.write(&CHIP8_CONTEMPORARY_FONT, font_addr)?;
        Ok(mm)
    }

    /// load a CHIP-8 program at 0x200; nothing is written if it doesn't fit
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        if program.len() > CHIP8_MAX_PROGRAM_BYTES {
            return Err(LoadError::TooLarge {
                size: program.len(),
                max: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        self.write(program, self.program_addr)?;
        debug!(
            "loaded {} byte program at {:#05x}",
            program.len(),
            self.program_addr
        );
        Ok(())
    }

    /// address of the glyph for the low nibble of `digit`
    pub fn glyph_addr(&self, digit: u8) -> u16 {
        self.font_addr
            .wrapping_add((digit & 0x0f) as u16 * CHIP8_FONT_GLYPH_BYTES)
    }
}

pub const CHIP8_CONTEMPORARY_FONT: [u8; 80] = [
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
