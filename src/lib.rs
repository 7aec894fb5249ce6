//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * the interpreter owns all machine state: 4K memory, V0-VF, I, the
//!   program counter, the call stack, the delay and sound timers and the
//!   64x32 frame buffer
//! * `Chip8Interpreter::step` runs exactly one instruction; it never sleeps
//!   or blocks, and it never ticks the timers
//! * the main loop (`environment`) decides how often to step and how often
//!   to tick the timers; it also owns the screen, keyboard and buzzer
//! * abstract display so can plug alternatives; starting with TUI in-console
//! * input device, with trait for reading key-presses
//! * audio device, with trait for making beeps
//! * the instructions that CHIP-8 interpreters disagree on (shifts, BNNN)
//!   are picked at run time through `config::Quirks`
//!
//! Model
//!
//! Environment
//!  |-- display, input, audio, timing
//!  |-- interpreter(config)
//!  |    |-- memory(font, program)
//!  |    |-- stack, timers, frame buffer
//!  |    `-- instruction decoder
//!  `-- main loop, once per timer tick
//!       |-- input.poll()
//!       |-- interpreter.step() * instructions_per_frame
//!       |-- interpreter.tick_timers()
//!       |-- sound.set_active(interpreter.sound_active())
//!       `-- display.draw(interpreter.frame())
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod sound;
pub mod stack;
pub mod timer;
