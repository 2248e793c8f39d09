use thiserror::Error;

/// Everything that can end an emulation session.
///
/// Unknown opcodes are deliberately absent: they are logged and skipped.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("ROM is {size} bytes but only {max} bytes of program memory are available")]
    OversizedRom { size: usize, max: usize },

    #[error("call stack overflow at pc {pc:#05X}")]
    StackOverflow { pc: u16 },

    #[error("return with an empty call stack at pc {pc:#05X}")]
    StackUnderflow { pc: u16 },

    #[error("memory access out of bounds at {address:#06X}")]
    OutOfBounds { address: usize },

    #[error("unable to read ROM: {0}")]
    Io(#[from] std::io::Error),

    #[error("frontend failure: {0}")]
    Frontend(String),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;
