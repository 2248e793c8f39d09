use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use chip8_core::constants::CYCLE_SLEEP;
use chip8_core::Config;
use chip8_display::SCALE;

mod keymap;
mod run;

#[derive(Parser, Debug)]
#[command(name = "chip8", about = "A CHIP-8 interpreter", long_about = None)]
struct Args {
    /// ROM image to run
    rom: PathBuf,

    /// Seed for the random number instruction, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Microseconds to sleep between instructions
    #[arg(long, default_value_t = CYCLE_SLEEP.as_micros() as u64)]
    sleep_us: u64,

    /// Window size multiplier
    #[arg(long, default_value_t = SCALE)]
    scale: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = Config {
        cycle_sleep: Duration::from_micros(args.sleep_us),
        seed: args.seed,
    };

    let halt = run::run(&args.rom, &config, args.scale)?;
    log::info!("stopped: {:?}", halt);
    Ok(())
}
