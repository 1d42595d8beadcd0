use std::time::{Duration, Instant};

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// `Instant`-backed clock for native hosts.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Per-frame time values, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTiming {
    /// Seconds since the renderer was constructed.
    pub elapsed: f32,
    /// Seconds since the previous frame (or since construction, for the first frame).
    pub delta: f32,
}

/// Load time + previous-frame time.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    load_time: Duration,
    prev_time: Duration,
}

impl FrameClock {
    pub fn start(now: Duration) -> Self {
        Self {
            load_time: now,
            prev_time: now,
        }
    }

    /// Computes this frame's timing from a single sample and makes it the previous frame.
    pub fn tick(&mut self, now: Duration) -> FrameTiming {
        let elapsed = now.saturating_sub(self.load_time);
        let delta = now.saturating_sub(self.prev_time);
        self.prev_time = now;
        FrameTiming {
            elapsed: elapsed.as_secs_f32(),
            delta: delta.as_secs_f32(),
        }
    }
}
