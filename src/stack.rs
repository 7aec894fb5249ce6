use crate::error::StackError;

/// how many return addresses fit on the call stack
pub const CHIP8_STACK_DEPTH: usize = 16;

/// Fixed-capacity LIFO of return addresses for 2NNN / 00EE
#[derive(Debug, Clone)]
pub struct CallStack {
    frames: [u16; CHIP8_STACK_DEPTH],
    depth: usize,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            frames: [0; CHIP8_STACK_DEPTH],
            depth: 0,
        }
    }

    /// push a return address; a full stack is left untouched
    pub fn push(&mut self, addr: u16) -> Result<(), StackError> {
        if self.depth == CHIP8_STACK_DEPTH {
            return Err(StackError::Overflow);
        }
        self.frames[self.depth] = addr;
        self.depth += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, StackError> {
        if self.depth == 0 {
            return Err(StackError::Underflow);
        }
        self.depth -= 1;
        Ok(self.frames[self.depth])
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// live frames, oldest first
    pub fn frames(&self) -> &[u16] {
        &self.frames[..self.depth]
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}
