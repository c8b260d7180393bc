use std::thread;
use std::time::{Duration, Instant};

use crate::actions::FrameTime;

/// A world driven by the fixed-timestep loop.
pub trait Simulation {
    fn load(&mut self);
    fn update(&mut self, time: FrameTime);
    fn unload(&mut self);

    /// Lets the simulation end the loop on its own.
    fn is_finished(&self) -> bool {
        false
    }
}

/// Time source for the loop runner.
pub trait Clock {
    /// Time since the clock started.
    fn now(&mut self) -> Duration;

    /// Called when the loop is ahead of schedule.
    fn wait(&mut self, _duration: Duration) {}
}

#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&mut self) -> Duration {
        self.start.elapsed()
    }

    fn wait(&mut self, duration: Duration) {
        if duration > Duration::ZERO {
            thread::sleep(duration);
        }
    }
}

/// Advances by a fixed step every time it is read. Used for headless runs and tests.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Duration,
    step: Duration,
}

impl ManualClock {
    /// A zero step would stall the loop, so it falls back to one millisecond.
    pub fn new(step: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            step: if step.is_zero() {
                Duration::from_millis(1)
            } else {
                step
            },
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> Duration {
        let now = self.now;
        self.now = self.now.saturating_add(self.step);
        now
    }
}
