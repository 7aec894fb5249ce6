//! # interpreter
//!
//! Machine state plus the fetch/decode/execute step. One call to `step` runs
//! exactly one instruction and returns; how often it's called, and how often
//! the timers tick, is up to whoever drives it (see `environment`).
//!
//! FX0A (wait for key) never blocks inside `step`: if nothing is held the
//! program counter is left pointing at the same instruction, so it simply
//! runs again next step. This busy-poll keeps stepping synchronous.
use crate::config::{Config, JumpOffsetQuirk, ShiftQuirk, UnknownOpcodePolicy};
use crate::display::{FrameBuffer, CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_WIDTH};
use crate::error::{EngineError, LoadError};
use crate::input::Keyboard;
use crate::instruction::Instruction;
use crate::memory::{self, MemoryMap};
use crate::stack::CallStack;
use crate::timer::Timers;
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

pub const CHIP8_REGISTER_COUNT: usize = 16;

/// VF doubles as the carry / borrow / collision flag
pub const VFLAG: usize = 0xF;

/// highest architecturally meaningful address; FX1E flags going past it
const CHIP8_ADDR_MAX: u16 = 0x0FFF;

/// how the program counter moves on after an instruction
enum Advance {
    /// on to the following instruction
    Next,
    /// over the following instruction
    Skip,
    /// the instruction set the program counter itself
    Jumped,
    /// run this instruction again next step
    Repeat,
}

pub struct Chip8Interpreter {
    memory: memory::Chip8MemoryMap,
    frame: FrameBuffer,
    stack: CallStack,
    timers: Timers,
    registers: [u8; CHIP8_REGISTER_COUNT],
    i: u16,
    program_counter: u16,
    config: Config,
    rng: StdRng,
}

impl Chip8Interpreter {
    pub fn new(config: Config) -> Result<Chip8Interpreter, LoadError> {
        let memory = memory::Chip8MemoryMap::new(config.font_addr)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        debug!("new interpreter with {:?}", config);
        Ok(Chip8Interpreter {
            program_counter: memory.program_addr,
            memory,
            frame: FrameBuffer::new(),
            stack: CallStack::new(),
            timers: Timers::default(),
            registers: [0; CHIP8_REGISTER_COUNT],
            i: 0,
            config,
            rng,
        })
    }

    /// load a chip8 program image at 0x200 and point the program counter at it
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        self.memory.load_program(program)?;
        self.program_counter = self.memory.program_addr;
        Ok(())
    }

    /// load a chip8 program from a file or similar
    pub fn load_program_from(&mut self, reader: &mut impl io::Read) -> Result<(), LoadError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load_program(&buf)
    }

    /// count the delay and sound timers down; call this at 60Hz
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    pub fn sound_active(&self) -> bool {
        self.timers.sound_active()
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn registers(&self) -> &[u8; CHIP8_REGISTER_COUNT] {
        &self.registers
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn timers(&self) -> Timers {
        self.timers
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn memory(&self) -> &memory::Chip8MemoryMap {
        &self.memory
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// read the instruction word at the program counter
    fn fetch(&self) -> u16 {
        self.memory.get_word(self.program_counter)
    }

    /// fetch, decode and execute exactly one instruction
    pub fn step(&mut self, keyboard: &impl Keyboard) -> Result<(), EngineError> {
        let addr = self.program_counter;
        let word = self.fetch();
        let instruction = match Instruction::decode(word, addr) {
            Ok(instruction) => instruction,
            Err(e) => match self.config.unknown_opcodes {
                UnknownOpcodePolicy::Halt => return Err(e),
                UnknownOpcodePolicy::Skip => {
                    warn!("skipping {}", e);
                    self.program_counter = addr.wrapping_add(2);
                    return Ok(());
                }
            },
        };
        trace!("{:#05x}: {:04x}  {}", addr, word, instruction);
        self.execute(instruction, keyboard)
    }

    fn execute(
        &mut self,
        instruction: Instruction,
        keyboard: &impl Keyboard,
    ) -> Result<(), EngineError> {
        use Instruction::*;

        let advance = match instruction {
            ClearScreen => {
                self.frame.clear();
                Advance::Next
            }
            Return => {
                self.program_counter = self.stack.pop()?;
                Advance::Jumped
            }
            Jump(nnn) => {
                self.program_counter = nnn;
                Advance::Jumped
            }
            Call(nnn) => {
                // push first, then jump: a full stack still takes the jump
                // but the overflow is reported
                let pushed = self.stack.push(self.program_counter.wrapping_add(2));
                self.program_counter = nnn;
                pushed?;
                Advance::Jumped
            }
            SkipIfEqualsConstant(x, nn) => self.skip_if(self.v(x) == nn),
            SkipIfNotEqualsConstant(x, nn) => self.skip_if(self.v(x) != nn),
            SkipIfEquals(x, y) => self.skip_if(self.v(x) == self.v(y)),
            SkipIfNotEquals(x, y) => self.skip_if(self.v(x) != self.v(y)),
            SetConstant(x, nn) => {
                self.set_v(x, nn);
                Advance::Next
            }
            AddConstant(x, nn) => {
                // no carry for this one
                self.set_v(x, self.v(x).wrapping_add(nn));
                Advance::Next
            }
            Set(x, y) => {
                self.set_v(x, self.v(y));
                Advance::Next
            }
            Or(x, y) => {
                self.set_v(x, self.v(x) | self.v(y));
                Advance::Next
            }
            And(x, y) => {
                self.set_v(x, self.v(x) & self.v(y));
                Advance::Next
            }
            Xor(x, y) => {
                self.set_v(x, self.v(x) ^ self.v(y));
                Advance::Next
            }
            Add(x, y) => {
                let (vx, vy) = (self.v(x), self.v(y));
                let carry = vx > u8::MAX - vy;
                self.set_v(x, vx.wrapping_add(vy));
                self.set_flag(carry);
                Advance::Next
            }
            Sub(x, y) => {
                let (vx, vy) = (self.v(x), self.v(y));
                self.set_v(x, vx.wrapping_sub(vy));
                self.set_flag(vx > vy);
                Advance::Next
            }
            SubReversed(x, y) => {
                let (vx, vy) = (self.v(x), self.v(y));
                self.set_v(x, vy.wrapping_sub(vx));
                self.set_flag(vy > vx);
                Advance::Next
            }
            ShiftRight(x, y) => {
                let source = self.shift_source(x, y);
                self.set_v(x, source >> 1);
                self.set_flag(source & 0x01 == 0x01);
                Advance::Next
            }
            ShiftLeft(x, y) => {
                let source = self.shift_source(x, y);
                self.set_v(x, source << 1);
                self.set_flag(source & 0x80 == 0x80);
                Advance::Next
            }
            SetIndex(nnn) => {
                self.i = nnn;
                Advance::Next
            }
            JumpWithOffset(x, nnn) => {
                let offset = match self.config.quirks.jump_offset {
                    JumpOffsetQuirk::Legacy => self.v(0),
                    JumpOffsetQuirk::Modern => self.v(x),
                };
                self.program_counter = nnn.wrapping_add(offset as u16);
                Advance::Jumped
            }
            Random(x, nn) => {
                let r: u8 = self.rng.gen();
                self.set_v(x, r & nn);
                Advance::Next
            }
            Draw(x, y, n) => {
                let dx = self.v(x) as usize % CHIP8_DISPLAY_WIDTH;
                let dy = self.v(y) as usize % CHIP8_DISPLAY_HEIGHT;
                let sprite: Vec<u8> = (0..n as u16)
                    .map(|row| self.memory.get_byte(self.i.wrapping_add(row)))
                    .collect();
                self.registers[VFLAG] = 0;
                let collision = self.frame.draw(dx, dy, &sprite);
                self.set_flag(collision);
                Advance::Next
            }
            SkipIfKeyDown(x) => self.skip_if(keyboard.is_pressed(self.v(x) & 0x0f)),
            SkipIfKeyUp(x) => self.skip_if(!keyboard.is_pressed(self.v(x) & 0x0f)),
            GetDelayTimer(x) => {
                self.set_v(x, self.timers.delay);
                Advance::Next
            }
            WaitForKey(x) => match keyboard.first_pressed() {
                Some(key) => {
                    self.set_v(x, key);
                    Advance::Next
                }
                None => Advance::Repeat,
            },
            SetDelayTimer(x) => {
                self.timers.delay = self.v(x);
                Advance::Next
            }
            SetSoundTimer(x) => {
                self.timers.sound = self.v(x);
                Advance::Next
            }
            AddToIndex(x) => {
                self.i = self.i.wrapping_add(self.v(x) as u16);
                self.set_flag(self.i > CHIP8_ADDR_MAX);
                Advance::Next
            }
            SetIndexToGlyph(x) => {
                self.i = self.memory.glyph_addr(self.v(x));
                Advance::Next
            }
            StoreBcd(x) => {
                let v = self.v(x);
                self.memory.set_byte(self.i, v / 100);
                self.memory.set_byte(self.i.wrapping_add(1), v / 10 % 10);
                self.memory.set_byte(self.i.wrapping_add(2), v % 10);
                Advance::Next
            }
            Store(x) => {
                for r in 0..=x {
                    let value = self.v(r);
                    self.memory.set_byte(self.i.wrapping_add(r as u16), value);
                }
                Advance::Next
            }
            Load(x) => {
                for r in 0..=x {
                    let value = self.memory.get_byte(self.i.wrapping_add(r as u16));
                    self.set_v(r, value);
                }
                Advance::Next
            }
        };

        match advance {
            Advance::Next => self.program_counter = self.program_counter.wrapping_add(2),
            Advance::Skip => self.program_counter = self.program_counter.wrapping_add(4),
            Advance::Jumped | Advance::Repeat => (),
        }
        Ok(())
    }

    fn v(&self, r: u8) -> u8 {
        self.registers[r as usize]
    }

    fn set_v(&mut self, r: u8, value: u8) {
        self.registers[r as usize] = value;
    }

    fn set_flag(&mut self, set: bool) {
        self.registers[VFLAG] = set as u8;
    }

    fn skip_if(&self, condition: bool) -> Advance {
        if condition {
            Advance::Skip
        } else {
            Advance::Next
        }
    }

    fn shift_source(&self, x: u8, y: u8) -> u8 {
        match self.config.quirks.shift {
            ShiftQuirk::Legacy => self.v(y),
            ShiftQuirk::Modern => self.v(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Quirks;
    use crate::input::Keypad;
    use crate::stack::CHIP8_STACK_DEPTH;

    fn interpreter_with(config: Config, program: &[u8]) -> Chip8Interpreter {
        let mut i = Chip8Interpreter::new(config).expect("interpreter");
        i.load_program(program).expect("program fits");
        i
    }

    fn interpreter(program: &[u8]) -> Chip8Interpreter {
        interpreter_with(
            Config {
                seed: Some(8),
                ..Config::default()
            },
            program,
        )
    }

    fn run(i: &mut Chip8Interpreter, steps: usize) -> Result<(), EngineError> {
        let keys = Keypad::new();
        for _ in 0..steps {
            i.step(&keys)?;
        }
        Ok(())
    }

    #[test]
    fn test_program_load_ok() -> Result<(), LoadError> {
        let mut i = Chip8Interpreter::new(Config::default())?;
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        i.load_program_from(&mut prog)?;
        assert_eq!(i.program_counter(), 0x200);
        assert_eq!(i.memory().get_word(0x200), 0x00e0);
        Ok(())
    }

    #[test]
    fn test_program_load_too_large_leaves_memory() -> Result<(), LoadError> {
        let mut i = Chip8Interpreter::new(Config::default())?;
        let result = i.load_program(&[0x12; memory::CHIP8_MAX_PROGRAM_BYTES + 1]);
        assert!(matches!(result, Err(LoadError::TooLarge { .. })));
        assert_eq!(i.memory().get_word(0x200), 0x0000);
        Ok(())
    }

    #[test]
    fn test_clear_screen() -> Result<(), EngineError> {
        let mut i = interpreter(&[0x00, 0xe0]);
        i.frame.draw(0, 0, &[0xff, 0xff]);
        run(&mut i, 1)?;
        assert_eq!(i.frame().lit_count(), 0);
        assert_eq!(i.program_counter(), 0x202);
        Ok(())
    }

    #[test]
    fn test_set_register() -> Result<(), EngineError> {
        let mut i = interpreter(&[0x61, 0x42]);
        run(&mut i, 1)?;
        assert_eq!(i.registers()[1], 0x42);
        assert_eq!(i.program_counter(), 0x202);
        Ok(())
    }

    #[test]
    fn test_call_and_return() -> Result<(), EngineError> {
        let mut program = vec![0u8; 0x102];
        program[0..2].copy_from_slice(&[0x23, 0x00]);
        program[0x100..0x102].copy_from_slice(&[0x00, 0xee]);
        let mut i = interpreter(&program);
        run(&mut i, 1)?;
        assert_eq!(i.program_counter(), 0x300);
        assert_eq!(i.stack().frames(), &[0x202]);
        run(&mut i, 1)?;
        assert_eq!(i.program_counter(), 0x202);
        assert_eq!(i.stack().depth(), 0);
        Ok(())
    }

    #[test]
    fn test_return_on_empty_stack_underflows() {
        let mut i = interpreter(&[0x00, 0xee]);
        assert_eq!(run(&mut i, 1), Err(EngineError::StackUnderflow));
        assert_eq!(i.program_counter(), 0x200);
    }

    #[test]
    fn test_call_overflow_still_jumps() {
        // 0x200: call 0x200, forever
        let mut i = interpreter(&[0x22, 0x00]);
        for _ in 0..CHIP8_STACK_DEPTH {
            assert_eq!(run(&mut i, 1), Ok(()));
        }
        assert_eq!(i.stack().depth(), CHIP8_STACK_DEPTH);
        i.program_counter = 0x200;
        i.memory.write(&[0x24, 0x00], 0x200).expect("in bounds");
        assert_eq!(run(&mut i, 1), Err(EngineError::StackOverflow));
        assert_eq!(i.program_counter(), 0x400);
        assert_eq!(i.stack().depth(), CHIP8_STACK_DEPTH);
        assert!(i.stack().frames().iter().all(|f| *f == 0x202));
    }

    #[test]
    fn test_jump() -> Result<(), EngineError> {
        let mut i = interpreter(&[0x1a, 0xbc]);
        run(&mut i, 1)?;
        assert_eq!(i.program_counter(), 0xabc);
        Ok(())
    }

    #[test]
    fn test_add_constant_wraps_without_flag() -> Result<(), EngineError> {
        let mut i = interpreter(&[0x65, 0xfa, 0x6f, 0x07, 0x75, 0x0a]);
        run(&mut i, 3)?;
        assert_eq!(i.registers()[5], 4);
        assert_eq!(i.registers()[VFLAG], 7);
        assert_eq!(i.program_counter(), 0x206);
        Ok(())
    }

    #[test]
    fn test_add_constant_every_value() -> Result<(), EngineError> {
        for start in [0u8, 1, 127, 200, 255] {
            for nn in [0u8, 1, 55, 128, 255] {
                let mut i = interpreter(&[0x63, start, 0x73, nn]);
                run(&mut i, 2)?;
                assert_eq!(i.registers()[3], start.wrapping_add(nn));
                assert_eq!(i.registers()[VFLAG], 0);
            }
        }
        Ok(())
    }

    #[test]
    fn test_skips() -> Result<(), EngineError> {
        // V1 = 5, V2 = 5, V3 = 6
        let setup = [0x61, 0x05, 0x62, 0x05, 0x63, 0x06];
        let cases: [([u8; 2], u16); 8] = [
            ([0x31, 0x05], 0x20a),
            ([0x31, 0x06], 0x208),
            ([0x41, 0x06], 0x20a),
            ([0x41, 0x05], 0x208),
            ([0x51, 0x20], 0x20a),
            ([0x51, 0x30], 0x208),
            ([0x91, 0x30], 0x20a),
            ([0x91, 0x20], 0x208),
        ];
        for (skip, pc) in cases {
            let mut program = setup.to_vec();
            program.extend_from_slice(&skip);
            let mut i = interpreter(&program);
            run(&mut i, 4)?;
            assert_eq!(i.program_counter(), pc, "{:02x?}", skip);
        }
        Ok(())
    }

    #[test]
    fn test_register_skips_ignore_low_nibble() -> Result<(), EngineError> {
        // V1 = V2 = 0
        let mut i = interpreter(&[0x51, 0x21]);
        run(&mut i, 1)?;
        assert_eq!(i.program_counter(), 0x204);

        let mut i = interpreter(&[0x91, 0x2f]);
        run(&mut i, 1)?;
        assert_eq!(i.program_counter(), 0x202);

        let mut i = interpreter(&[0x61, 0x01, 0x91, 0x2f]);
        run(&mut i, 2)?;
        assert_eq!(i.program_counter(), 0x206);
        Ok(())
    }

    #[test]
    fn test_logic_ops() -> Result<(), EngineError> {
        let mut i = interpreter(&[
            0x61, 0b1100, 0x62, 0b1010, // V1, V2
            0x83, 0x10, // V3 = V1
            0x83, 0x21, // V3 |= V2
            0x84, 0x10, // V4 = V1
            0x84, 0x22, // V4 &= V2
            0x85, 0x10, // V5 = V1
            0x85, 0x23, // V5 ^= V2
        ]);
        run(&mut i, 8)?;
        assert_eq!(i.registers()[3], 0b1110);
        assert_eq!(i.registers()[4], 0b1000);
        assert_eq!(i.registers()[5], 0b0110);
        Ok(())
    }

    #[test]
    fn test_add_registers_carry() -> Result<(), EngineError> {
        for (a, b) in [(0u8, 0u8), (255, 0), (255, 1), (128, 128), (127, 128), (200, 100)] {
            let mut i = interpreter(&[0x61, a, 0x62, b, 0x81, 0x24]);
            run(&mut i, 3)?;
            assert_eq!(i.registers()[1], a.wrapping_add(b));
            let carry = (a as u16 + b as u16) > 255;
            assert_eq!(i.registers()[VFLAG], carry as u8, "{} + {}", a, b);
        }
        Ok(())
    }

    #[test]
    fn test_sub_registers_borrow() -> Result<(), EngineError> {
        for (a, b) in [(5u8, 3u8), (3, 5), (4, 4), (0, 255), (255, 0)] {
            let mut i = interpreter(&[0x61, a, 0x62, b, 0x81, 0x25]);
            run(&mut i, 3)?;
            assert_eq!(i.registers()[1], a.wrapping_sub(b));
            assert_eq!(i.registers()[VFLAG], (a > b) as u8, "{} - {}", a, b);

            let mut i = interpreter(&[0x61, a, 0x62, b, 0x81, 0x27]);
            run(&mut i, 3)?;
            assert_eq!(i.registers()[1], b.wrapping_sub(a));
            assert_eq!(i.registers()[VFLAG], (b > a) as u8, "{} - {}", b, a);
        }
        Ok(())
    }

    #[test]
    fn test_flag_wins_when_vf_is_the_target() -> Result<(), EngineError> {
        let mut i = interpreter(&[0x6f, 0xff, 0x61, 0x03, 0x8f, 0x14]);
        run(&mut i, 3)?;
        assert_eq!(i.registers()[VFLAG], 1);
        Ok(())
    }

    #[test]
    fn test_shift_modern() -> Result<(), EngineError> {
        let mut i = interpreter(&[0x61, 0b1000_0011, 0x62, 0x00, 0x81, 0x26]);
        run(&mut i, 3)?;
        assert_eq!(i.registers()[1], 0b0100_0001);
        assert_eq!(i.registers()[VFLAG], 1);

        let mut i = interpreter(&[0x61, 0b1000_0010, 0x62, 0x00, 0x81, 0x2e]);
        run(&mut i, 3)?;
        assert_eq!(i.registers()[1], 0b0000_0100);
        assert_eq!(i.registers()[VFLAG], 1);

        let mut i = interpreter(&[0x61, 0b0100_0010, 0x81, 0x2e]);
        run(&mut i, 2)?;
        assert_eq!(i.registers()[1], 0b1000_0100);
        assert_eq!(i.registers()[VFLAG], 0);
        Ok(())
    }

    #[test]
    fn test_shift_legacy_copies_vy() -> Result<(), EngineError> {
        let config = Config {
            quirks: Quirks::legacy(),
            ..Config::default()
        };
        let mut i = interpreter_with(config, &[0x61, 0xff, 0x62, 0b0000_0110, 0x81, 0x26]);
        run(&mut i, 3)?;
        assert_eq!(i.registers()[1], 0b0000_0011);
        assert_eq!(i.registers()[2], 0b0000_0110);
        assert_eq!(i.registers()[VFLAG], 0);

        let mut i = interpreter_with(config, &[0x61, 0x00, 0x62, 0b1000_0001, 0x81, 0x2e]);
        run(&mut i, 3)?;
        assert_eq!(i.registers()[1], 0b0000_0010);
        assert_eq!(i.registers()[VFLAG], 1);
        Ok(())
    }

    #[test]
    fn test_set_index() -> Result<(), EngineError> {
        let mut i = interpreter(&[0xa1, 0x23]);
        run(&mut i, 1)?;
        assert_eq!(i.index(), 0x123);
        Ok(())
    }

    #[test]
    fn test_jump_with_offset_modern() -> Result<(), EngineError> {
        // V0 = 1, V3 = 0x10; B320 => 0x320 + V3
        let mut i = interpreter(&[0x60, 0x01, 0x63, 0x10, 0xb3, 0x20]);
        run(&mut i, 3)?;
        assert_eq!(i.program_counter(), 0x330);
        Ok(())
    }

    #[test]
    fn test_jump_with_offset_legacy() -> Result<(), EngineError> {
        let config = Config {
            quirks: Quirks::legacy(),
            ..Config::default()
        };
        let mut i = interpreter_with(config, &[0x60, 0x01, 0x63, 0x10, 0xb3, 0x20]);
        run(&mut i, 3)?;
        assert_eq!(i.program_counter(), 0x321);
        Ok(())
    }

    #[test]
    fn test_random_is_masked() -> Result<(), EngineError> {
        let mut i = interpreter(&[0xc1, 0x0f, 0xc2, 0x00]);
        i.registers[2] = 0xff;
        run(&mut i, 2)?;
        assert_eq!(i.registers()[1] & 0xf0, 0);
        assert_eq!(i.registers()[2], 0);
        Ok(())
    }

    #[test]
    fn test_random_is_reproducible_with_seed() -> Result<(), EngineError> {
        let program = [0xc1, 0xff, 0xc2, 0xff, 0xc3, 0xff];
        let mut a = interpreter(&program);
        let mut b = interpreter(&program);
        run(&mut a, 3)?;
        run(&mut b, 3)?;
        assert_eq!(a.registers(), b.registers());
        Ok(())
    }

    #[test]
    fn test_draw_glyph_and_collide() -> Result<(), EngineError> {
        // V1 = 0, V2 = 0, I = glyph 0, draw 5 rows, draw again
        let mut i = interpreter(&[0x61, 0x00, 0x62, 0x00, 0xf1, 0x29, 0xd1, 0x25, 0xd1, 0x25]);
        run(&mut i, 4)?;
        assert_eq!(i.registers()[VFLAG], 0);
        // "0" glyph: 4 + 2 + 2 + 2 + 4 lit pixels
        assert_eq!(i.frame().lit_count(), 14);
        assert!(i.frame().get(0, 0));
        assert!(!i.frame().get(1, 1));
        run(&mut i, 1)?;
        assert_eq!(i.registers()[VFLAG], 1);
        assert_eq!(i.frame().lit_count(), 0);
        Ok(())
    }

    #[test]
    fn test_draw_start_coordinates_wrap() -> Result<(), EngineError> {
        // V1 = 64 + 3, V2 = 32 + 1
        let mut i = interpreter(&[0x61, 67, 0x62, 33, 0xa0, 0x00, 0xd1, 0x21]);
        run(&mut i, 4)?;
        // top row of glyph 0 is 0xF0
        assert!(i.frame().get(3, 1));
        assert!(i.frame().get(6, 1));
        assert_eq!(i.frame().lit_count(), 4);
        Ok(())
    }

    #[test]
    fn test_draw_clears_stale_flag() -> Result<(), EngineError> {
        let mut i = interpreter(&[0x6f, 0x01, 0xd0, 0x01]);
        run(&mut i, 2)?;
        assert_eq!(i.registers()[VFLAG], 0);
        Ok(())
    }

    #[test]
    fn test_skip_if_key() -> Result<(), EngineError> {
        let mut keys = Keypad::new();
        keys.press(0xa);

        let mut i = interpreter(&[0x61, 0x0a, 0xe1, 0x9e]);
        i.step(&keys)?;
        i.step(&keys)?;
        assert_eq!(i.program_counter(), 0x206);

        let mut i = interpreter(&[0x61, 0x0a, 0xe1, 0xa1]);
        i.step(&keys)?;
        i.step(&keys)?;
        assert_eq!(i.program_counter(), 0x204);

        // only the low nibble of VX picks the key
        let mut i = interpreter(&[0x61, 0x1a, 0xe1, 0x9e]);
        i.step(&keys)?;
        i.step(&keys)?;
        assert_eq!(i.program_counter(), 0x206);
        Ok(())
    }

    #[test]
    fn test_wait_for_key_repeats_until_pressed() -> Result<(), EngineError> {
        let mut i = interpreter(&[0xf3, 0x0a]);
        let mut keys = Keypad::new();
        for _ in 0..3 {
            i.step(&keys)?;
            assert_eq!(i.program_counter(), 0x200);
        }
        keys.press(0x7);
        keys.press(0xe);
        i.step(&keys)?;
        assert_eq!(i.registers()[3], 0x7);
        assert_eq!(i.program_counter(), 0x202);
        Ok(())
    }

    #[test]
    fn test_timers() -> Result<(), EngineError> {
        let mut i = interpreter(&[0x61, 0x03, 0xf1, 0x15, 0xf1, 0x18, 0xf2, 0x07]);
        run(&mut i, 3)?;
        assert_eq!(i.timers(), Timers { delay: 3, sound: 3 });
        assert!(i.sound_active());
        // the interpreter never ticks the timers itself
        i.tick_timers();
        run(&mut i, 1)?;
        assert_eq!(i.registers()[2], 2);
        i.tick_timers();
        i.tick_timers();
        assert!(!i.sound_active());
        Ok(())
    }

    #[test]
    fn test_add_to_index_flags_overflow() -> Result<(), EngineError> {
        let mut i = interpreter(&[0xaf, 0xf0, 0x61, 0x0f, 0xf1, 0x1e, 0xf1, 0x1e]);
        run(&mut i, 3)?;
        assert_eq!(i.index(), 0xfff);
        assert_eq!(i.registers()[VFLAG], 0);
        run(&mut i, 1)?;
        assert_eq!(i.index(), 0x100e);
        assert_eq!(i.registers()[VFLAG], 1);
        Ok(())
    }

    #[test]
    fn test_glyph_address_follows_font() -> Result<(), EngineError> {
        let mut i = interpreter(&[0x61, 0xab, 0xf1, 0x29]);
        run(&mut i, 2)?;
        assert_eq!(i.index(), 0xb * 5);

        let config = Config {
            font_addr: 0x50,
            ..Config::default()
        };
        let mut i = interpreter_with(config, &[0x61, 0x02, 0xf1, 0x29]);
        run(&mut i, 2)?;
        assert_eq!(i.index(), 0x50 + 10);
        assert_eq!(i.memory().get_byte(i.index()), 0xf0);
        Ok(())
    }

    #[test]
    fn test_bcd() -> Result<(), EngineError> {
        let mut i = interpreter(&[0x61, 254, 0xa3, 0x00, 0xf1, 0x33]);
        run(&mut i, 3)?;
        assert_eq!(i.memory().get_ro_slice(0x300, 3), Some(&[2, 5, 4][..]));
        Ok(())
    }

    #[test]
    fn test_store_and_load_registers() -> Result<(), EngineError> {
        let mut i = interpreter(&[
            0x60, 0x11, 0x61, 0x22, 0x62, 0x33, 0x63, 0x44, // V0-V3
            0xa3, 0x00, 0xf2, 0x55, // store V0-V2
            0x60, 0x00, 0x61, 0x00, 0x62, 0x00, // zap them
            0xa3, 0x00, 0xf1, 0x65, // load V0-V1 only
        ]);
        run(&mut i, 11)?;
        assert_eq!(i.memory().get_ro_slice(0x300, 4), Some(&[0x11, 0x22, 0x33, 0][..]));
        assert_eq!(i.registers()[..4], [0x11, 0x22, 0x00, 0x44]);
        assert_eq!(i.index(), 0x300);
        Ok(())
    }

    #[test]
    fn test_unsupported_opcode_halts_untouched() {
        let mut i = interpreter(&[0xf1, 0x99]);
        let before = *i.registers();
        assert_eq!(
            run(&mut i, 1),
            Err(EngineError::UnsupportedOpcode {
                word: 0xf199,
                addr: 0x200
            })
        );
        assert_eq!(i.program_counter(), 0x200);
        assert_eq!(*i.registers(), before);
    }

    #[test]
    fn test_unsupported_opcode_skipped_when_configured() -> Result<(), EngineError> {
        let config = Config {
            unknown_opcodes: UnknownOpcodePolicy::Skip,
            ..Config::default()
        };
        let mut i = interpreter_with(config, &[0x01, 0x23, 0x61, 0x42]);
        run(&mut i, 2)?;
        assert_eq!(i.registers()[1], 0x42);
        assert_eq!(i.program_counter(), 0x204);
        Ok(())
    }

    #[test]
    fn test_fetch_wraps_at_top_of_memory() -> Result<(), EngineError> {
        let mut i = interpreter(&[]);
        // second byte comes from 0x000, the top row of glyph 0
        i.memory.set_byte(0xfff, 0x12);
        i.program_counter = 0xfff;
        run(&mut i, 1)?;
        assert_eq!(i.program_counter(), 0x2f0);
        Ok(())
    }
}
