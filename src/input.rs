use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use log::warn;
use std::collections::HashMap;
use std::io;
use std::time::Duration;

/// how many keys the COSMAC hex keypad has
pub const CHIP8_KEY_COUNT: usize = 16;

/// left-hand side of a qwerty keyboard, laid out like the hex keypad
///   1 2 3 C      1 2 3 4
///   4 5 6 D  <=  q w e r
///   7 8 9 E      a s d f
///   A 0 B F      z x c v
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00), // x
    ('1', 0x01), // 1
    ('2', 0x02), // 2
    ('3', 0x03), // 3
    ('q', 0x04), // q
    ('w', 0x05), // w
    ('e', 0x06), // e
    ('a', 0x07), // a
    ('s', 0x08), // s
    ('d', 0x09), // d
    ('z', 0x0a), // z
    ('c', 0x0b), // c
    ('4', 0x0c), // 4
    ('r', 0x0d), // r
    ('f', 0x0e), // f
    ('v', 0x0f), // v
];

/// terminals only report presses, so a key counts as held for this many
/// frames after its last press (or auto-repeat)
const KEY_HOLD_FRAMES: u8 = 6;

/// What the interpreter sees of the keypad: read only
pub trait Keyboard {
    /// is `key` (0x0-0xF) currently held down?
    fn is_pressed(&self, key: u8) -> bool;

    /// lowest numbered key currently held down, if any
    fn first_pressed(&self) -> Option<u8> {
        (0..CHIP8_KEY_COUNT as u8).find(|k| self.is_pressed(*k))
    }
}

/// Plain set of key states
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; CHIP8_KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Keypad::default()
    }

    pub fn press(&mut self, key: u8) {
        self.keys[key as usize & 0x0f] = true;
    }

    pub fn release(&mut self, key: u8) {
        self.keys[key as usize & 0x0f] = false;
    }
}

impl Keyboard for Keypad {
    fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }
}

/// A source of key presses driven by the main loop
pub trait Input {
    /// pull in whatever has happened since the last poll; called once a frame
    fn poll(&mut self) -> Result<(), io::Error>;

    /// current key states
    fn keypad(&self) -> &Keypad;

    /// has the user asked to stop?
    fn quit_requested(&self) -> bool {
        false
    }
}

/// Input from the terminal, using Crossterm in raw mode
pub struct StdinInput {
    keypad: Keypad,
    held_for: [u8; CHIP8_KEY_COUNT],
    keymap: HashMap<char, u8>,
    quit: bool,
}

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            keypad: Keypad::new(),
            held_for: [0; CHIP8_KEY_COUNT],
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            quit: false,
        })
    }

    fn press(&mut self, key: u8) {
        self.keypad.press(key);
        self.held_for[key as usize] = KEY_HOLD_FRAMES;
    }

    /// let go of anything that hasn't been pressed recently
    fn age_keys(&mut self) {
        for key in 0..CHIP8_KEY_COUNT {
            if self.held_for[key] > 0 {
                self.held_for[key] -= 1;
                if self.held_for[key] == 0 {
                    self.keypad.release(key as u8);
                }
            }
        }
    }

    fn handle_key(&mut self, evt: KeyEvent) {
        match evt.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit = true
            }
            KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                Some(mapped_key) => self.press(*mapped_key),
                None => warn!("can't map {:?} to a COSMAC key", key),
            },
            _ => warn!("unknown key event received"),
        }
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("couldn't restore terminal: {}", e);
        }
    }
}

impl Input for StdinInput {
    fn poll(&mut self) -> Result<(), io::Error> {
        self.age_keys();
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => self.handle_key(evt),
                Event::Resize(..) => (),
                _ => warn!("unknown event received"),
            }
        }
        Ok(())
    }

    fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// dummy Input implementation for testing; quits after `frames` polls
pub struct DummyInput {
    keypad: Keypad,
    frames: Option<usize>,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        let mut keypad = Keypad::new();
        for key in keys {
            keypad.press(*key);
        }
        DummyInput {
            keypad,
            frames: None,
        }
    }

    pub fn quit_after(mut self, frames: usize) -> Self {
        self.frames = Some(frames);
        self
    }
}

impl Input for DummyInput {
    fn poll(&mut self) -> Result<(), io::Error> {
        if let Some(frames) = self.frames.as_mut() {
            *frames = frames.saturating_sub(1);
        }
        Ok(())
    }

    fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    fn quit_requested(&self) -> bool {
        self.frames == Some(0)
    }
}
