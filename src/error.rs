use std::io;
use thiserror::Error;

/// Failures reported by a single fetch/decode/execute step. The driver is
/// expected to stop stepping when it sees one of these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("unsupported opcode {word:#06x} at {addr:#05x}")]
    UnsupportedOpcode { word: u16, addr: u16 },
}

/// Failures from the call stack itself
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum StackError {
    #[error("call stack is full")]
    Overflow,
    #[error("call stack is empty")]
    Underflow,
}

impl From<StackError> for EngineError {
    fn from(e: StackError) -> Self {
        match e {
            StackError::Overflow => EngineError::StackOverflow,
            StackError::Underflow => EngineError::StackUnderflow,
        }
    }
}

/// Failures copying data into memory, including loading a program
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("program is {size} bytes; at most {max} bytes fit")]
    TooLarge { size: usize, max: usize },
    #[error("copy of {len} bytes to {addr:#05x} would run off the end of memory")]
    OutOfBounds { addr: u16, len: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Bad instruction or timer rates
#[derive(Debug, Error, PartialEq, Clone, Copy)]
pub enum TimingError {
    #[error("{name} must be a positive number of Hz, not {value}")]
    InvalidRate { name: &'static str, value: f64 },
}

/// Failures that stop the main loop
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("sound device: {0}")]
    Sound(String),
}
