use std::thread;

use crate::chip8::{Chip8, Status};
use crate::config::Config;
use crate::error::Result;
use crate::state::{FrameBuffer, Keys};
use crate::timer::TickSource;

/// What the input collaborator wants after a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Continue,
    Quit,
}

/// Why `run` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// The program reached a zero instruction
    Sentinel,
    /// The frontend asked to stop
    Quit,
}

/// The renderer and keypad the driver syncs with once per timer tick
pub trait Frontend {
    /// Paint a snapshot of the frame buffer
    fn render(&mut self, frame: &FrameBuffer) -> Result<()>;

    /// Refresh `keys` in place from the host
    fn poll_keys(&mut self, keys: &mut Keys) -> Result<Input>;
}

/// Runs `chip8` until it halts, the frontend quits, or an instruction fails.
///
/// Each cycle executes one instruction, then applies however many 60Hz ticks
/// `clock` reports to the timers. The frontend is only consulted on cycles
/// where at least one tick elapsed.
pub fn run<C, F>(chip8: &mut Chip8, clock: &mut C, frontend: &mut F, config: &Config) -> Result<Halt>
where
    C: TickSource,
    F: Frontend,
{
    loop {
        if chip8.step()? == Status::Halted {
            return Ok(Halt::Sentinel);
        }

        let ticks = clock.elapsed_ticks();
        if !config.cycle_sleep.is_zero() {
            thread::sleep(config.cycle_sleep);
        }
        chip8.advance_timers(ticks);

        if ticks > 0 {
            frontend.render(chip8.frame())?;
            let mut keys = chip8.keys();
            if frontend.poll_keys(&mut keys)? == Input::Quit {
                log::info!("quit requested by frontend");
                return Ok(Halt::Quit);
            }
            chip8.set_keys(keys);
        }
    }
}
