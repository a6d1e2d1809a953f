//! Frame pacing. Submission and rendering run on ticks; input polling runs
//! as often as the loop spins.

use std::time::{Duration, Instant};

/// True once at least `interval` has passed since `last_tick`.
pub fn should_tick(now: Instant, last_tick: Instant, interval: Duration) -> bool {
    now.saturating_duration_since(last_tick) >= interval
}

#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Duration,
    last_tick: Instant,
}

impl FrameScheduler {
    /// The first tick fires one full interval after `start`.
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            last_tick: start,
        }
    }

    pub fn should_tick(&self, now: Instant) -> bool {
        should_tick(now, self.last_tick, self.interval)
    }

    /// Advance the tick clock to `now`.
    pub fn mark(&mut self, now: Instant) {
        self.last_tick = now;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
