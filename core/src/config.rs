use std::time::Duration;

use crate::constants::CYCLE_SLEEP;

/// Knobs for a single emulation session.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// How long the driver sleeps between cycles
    pub cycle_sleep: Duration,
    /// Seed for CXKK; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Config {
    pub fn with_seed(seed: u64) -> Self {
        Config {
            seed: Some(seed),
            ..Config::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cycle_sleep: CYCLE_SLEEP,
            seed: None,
        }
    }
}
