//! The main loop.
//!
//! Runs in frames at the timer rate. Each frame: poll input, run however
//! many instructions fit in a frame at the requested instruction rate, tick
//! the timers, switch the buzzer, then redraw. Fractions of an instruction
//! carry over to the next frame so odd rates still average out.
use crate::display::Display;
use crate::error::{RunError, TimingError};
use crate::input::Input;
use crate::interpreter::Chip8Interpreter;
use crate::sound::Sound;
use log::{debug, info};
use spin_sleep::LoopHelper;

pub const DEFAULT_INSTRUCTIONS_PER_SECOND: f64 = 700.0;
pub const DEFAULT_TIMER_HZ: f64 = 60.0;

/// a rate has to be finite and above zero or a frame never ends
pub fn check_rate(name: &'static str, value: f64) -> Result<f64, TimingError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(TimingError::InvalidRate { name, value })
    }
}

/// how fast to run things, in Hz
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    instructions_per_second: f64,
    timer_hz: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            timer_hz: DEFAULT_TIMER_HZ,
        }
    }
}

impl Timing {
    pub fn new(instructions_per_second: f64, timer_hz: f64) -> Result<Self, TimingError> {
        Ok(Timing {
            instructions_per_second: check_rate("instruction rate", instructions_per_second)?,
            timer_hz: check_rate("timer rate", timer_hz)?,
        })
    }

    pub fn instructions_per_second(&self) -> f64 {
        self.instructions_per_second
    }

    pub fn timer_hz(&self) -> f64 {
        self.timer_hz
    }

    fn instructions_per_frame(&self) -> f64 {
        self.instructions_per_second / self.timer_hz
    }
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stopped {
    /// the input asked to quit
    Quit,
    /// ran for the number of frames asked for
    FrameLimit,
}

pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    timing: Timing,
    carry: f64,
    frames: u64,
    steps: u64,
}

impl<'a> Environment<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        timing: Timing,
    ) -> Self {
        Environment {
            interpreter,
            display,
            input,
            sound,
            timing,
            carry: 0.0,
            frames: 0,
            steps: 0,
        }
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// run one frame's worth of everything without sleeping
    pub fn frame(&mut self) -> Result<(), RunError> {
        self.input.poll()?;

        self.carry += self.timing.instructions_per_frame();
        while self.carry >= 1.0 {
            self.carry -= 1.0;
            self.interpreter.step(self.input.keypad())?;
            self.steps += 1;
        }

        self.interpreter.tick_timers();
        self.sound
            .set_active(self.interpreter.sound_active())
            .map_err(|e| RunError::Sound(e.to_string()))?;
        self.display.draw(self.interpreter.frame())?;
        self.frames += 1;
        Ok(())
    }

    /// run frames at the timer rate until the input quits, something goes
    /// wrong, or `max_frames` have gone by
    pub fn run(&mut self, max_frames: Option<u64>) -> Result<Stopped, RunError> {
        let mut loop_helper = LoopHelper::builder().build_with_target_rate(self.timing.timer_hz);
        debug!("running with {:?}", self.timing);
        let result = loop {
            loop_helper.loop_start();
            if self.input.quit_requested() {
                break Ok(Stopped::Quit);
            }
            if max_frames.map_or(false, |max| self.frames >= max) {
                break Ok(Stopped::FrameLimit);
            }
            if let Err(e) = self.frame() {
                break Err(e);
            }
            loop_helper.loop_sleep();
        };
        // don't leave the buzzer on
        let silenced = self
            .sound
            .set_active(false)
            .map_err(|e| RunError::Sound(e.to_string()));
        info!("stopped after {} frames, {} instructions", self.frames, self.steps);
        let stopped = result?;
        silenced?;
        Ok(stopped)
    }
}
