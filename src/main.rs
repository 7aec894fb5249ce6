use clap::Parser;
use log::{error, info};
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use chip8_vm::config::{Config, JumpOffsetQuirk, Quirks, ShiftQuirk, UnknownOpcodePolicy};
use chip8_vm::display::MonoTermDisplay;
use chip8_vm::environment::{
    check_rate, Environment, Timing, DEFAULT_INSTRUCTIONS_PER_SECOND, DEFAULT_TIMER_HZ,
};
use chip8_vm::input::StdinInput;
use chip8_vm::interpreter::Chip8Interpreter;
use chip8_vm::memory::{CHIP8_CONTEMPORARY_FONT, CHIP8_PROGRAM_ADDR};
use chip8_vm::sound::{Mute, SimpleBeep, Sound};

#[derive(Parser, Debug)]
#[command(name = "chip8-vm", version, about = "CHIP-8 interpreter in the terminal")]
struct Args {
    /// CHIP-8 program image
    rom: PathBuf,

    /// Instructions to run per second
    #[arg(long, default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND, value_parser = parse_rate)]
    ips: f64,

    /// Timer and screen refresh rate
    #[arg(long, default_value_t = DEFAULT_TIMER_HZ, value_parser = parse_rate)]
    timer_hz: f64,

    /// 8XY6/8XYE copy VY into VX before shifting (COSMAC VIP)
    #[arg(long)]
    legacy_shift: bool,

    /// BNNN jumps to NNN + V0 (COSMAC VIP)
    #[arg(long)]
    legacy_jump: bool,

    /// Where to load the font
    #[arg(long, default_value = "0x000", value_parser = parse_addr)]
    font_addr: u16,

    /// Skip instructions that can't be decoded instead of stopping
    #[arg(long)]
    skip_unknown: bool,

    /// Seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// Sound the PC speaker
    #[arg(long)]
    beep: bool,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,
}

fn parse_rate(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    check_rate("rate", value).map_err(|e| e.to_string())
}

fn parse_addr(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    match parsed {
        Ok(addr) if addr as usize + CHIP8_CONTEMPORARY_FONT.len() <= CHIP8_PROGRAM_ADDR as usize => {
            Ok(addr)
        }
        Ok(addr) => Err(format!("a font at {:#x} would run into the program", addr)),
        Err(e) => Err(e.to_string()),
    }
}

impl Args {
    fn config(&self) -> Config {
        Config {
            quirks: Quirks {
                shift: if self.legacy_shift {
                    ShiftQuirk::Legacy
                } else {
                    ShiftQuirk::Modern
                },
                jump_offset: if self.legacy_jump {
                    JumpOffsetQuirk::Legacy
                } else {
                    JumpOffsetQuirk::Modern
                },
            },
            font_addr: self.font_addr,
            unknown_opcodes: if self.skip_unknown {
                UnknownOpcodePolicy::Skip
            } else {
                UnknownOpcodePolicy::Halt
            },
            seed: self.seed,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    // initialise
    let mut interpreter = Chip8Interpreter::new(args.config())?;
    let mut f = File::open(&args.rom)?;
    interpreter.load_program_from(&mut f)?;
    info!("loaded {}", args.rom.display());

    let mut display = MonoTermDisplay::new()?;
    let mut input = StdinInput::new()?;
    let mut sound: Box<dyn Sound> = if args.beep {
        Box::new(SimpleBeep::new())
    } else {
        Box::new(Mute::new())
    };
    let timing = Timing::new(args.ips, args.timer_hz)?;

    let mut env = Environment::new(
        interpreter,
        &mut display,
        &mut input,
        sound.as_mut(),
        timing,
    );
    let result = env.run(args.frames);
    drop(env);
    // put the terminal back before saying anything
    drop(input);

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..4 {
        println!();
    }
    match result {
        Ok(stopped) => {
            info!("stopped: {:?}", stopped);
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            Err(e.into())
        }
    }
}
