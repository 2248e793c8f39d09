use std::time::{Duration, Instant};

use crate::constants::TIMER_HZ;

/// Something that can say how many 60Hz timer ticks have passed since it was last asked
pub trait TickSource {
    fn elapsed_ticks(&mut self) -> u32;
}

/// # Timer clock
/// Derives 60Hz ticks from the wall clock.
///
/// Ticks are counted on absolute boundaries since `start` rather than by
/// accumulating per-sample durations, so sampling jitter never drifts the rate.
/// The first sample always reports 0.
pub struct TimerClock {
    start: Instant,
    last_tick: Option<u64>,
}

impl TimerClock {
    pub fn new() -> Self {
        TimerClock {
            start: Instant::now(),
            last_tick: None,
        }
    }

    /// Index of the tick containing `elapsed`
    fn tick_index(elapsed: Duration) -> u64 {
        (elapsed.as_nanos() * u128::from(TIMER_HZ) / 1_000_000_000) as u64
    }

    /// Ticks between the previous sample and `now`
    pub fn sample_at(&mut self, now: Instant) -> u32 {
        let tick = Self::tick_index(now.saturating_duration_since(self.start));
        let elapsed = match self.last_tick {
            Some(last) => tick.saturating_sub(last),
            None => 0,
        };
        self.last_tick = Some(tick);
        elapsed.min(u64::from(u32::MAX)) as u32
    }
}

impl Default for TimerClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for TimerClock {
    fn elapsed_ticks(&mut self) -> u32 {
        self.sample_at(Instant::now())
    }
}
