use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{anyhow, Context};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::EventPump;

use chip8_core::{Chip8, Chip8Error, Config, FrameBuffer, Frontend, Halt, Input, Keys, TimerClock};
use chip8_display::Display;

use crate::keymap::keymap;

/// The SDL2 window and keyboard as seen by the driver
pub struct SdlFrontend {
    display: Display,
    events: EventPump,
}

impl SdlFrontend {
    pub fn new(sdl: &sdl2::Sdl, scale: u32) -> Result<Self, String> {
        Ok(SdlFrontend {
            display: Display::new(sdl, scale)?,
            events: sdl.event_pump()?,
        })
    }
}

impl Frontend for SdlFrontend {
    fn render(&mut self, frame: &FrameBuffer) -> chip8_core::Result<()> {
        self.display.render(frame).map_err(Chip8Error::Frontend)
    }

    fn poll_keys(&mut self, keys: &mut Keys) -> chip8_core::Result<Input> {
        for event in self.events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => return Ok(Input::Quit),
                Event::KeyDown {
                    keycode: Some(key), ..
                } => {
                    if let Some(k) = keymap(key) {
                        keys[k] = true;
                    }
                }
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(k) = keymap(key) {
                        keys[k] = false;
                    }
                }
                _ => continue,
            };
        }
        Ok(Input::Continue)
    }
}

pub fn run(rom: &Path, config: &Config, scale: u32) -> anyhow::Result<Halt> {
    // Load ROM
    let file = File::open(rom).with_context(|| format!("unable to open {}", rom.display()))?;
    let mut reader = BufReader::new(file);
    let mut chip8 = Chip8::new(config);
    chip8
        .load_rom(&mut reader)
        .with_context(|| format!("unable to load {}", rom.display()))?;

    // Get SDL2 context
    let sdl = sdl2::init().map_err(|e| anyhow!(e))?;
    let mut frontend = SdlFrontend::new(&sdl, scale).map_err(|e| anyhow!(e))?;

    let mut clock = TimerClock::new();
    let halt = chip8_core::run(&mut chip8, &mut clock, &mut frontend, config)?;
    Ok(halt)
}
