/// The delay and sound countdown registers. The interpreter reads and writes
/// them; whoever drives the interpreter is responsible for calling `tick` at
/// the timer rate (60Hz on real hardware).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    /// count both timers down by one, stopping at zero
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// the buzzer sounds whilst the sound timer is non-zero
    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }
}
