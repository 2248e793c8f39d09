pub use chip8::{Chip8, Status};
pub use config::Config;
pub use driver::{run, Frontend, Halt, Input};
pub use error::{Chip8Error, Result};
pub use instruction::Instruction;
pub use state::{FrameBuffer, Keys, State};
pub use timer::{TickSource, TimerClock};

mod chip8;
mod config;
pub mod constants;
mod driver;
mod error;
mod instruction;
mod opcode;
mod operations;
pub mod state;
mod timer;
