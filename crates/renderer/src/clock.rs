use std::time::{Duration, Instant};

/// Snapshot produced by [`FrameClock::tick`] for a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    /// Time elapsed since the previous tick.
    pub delta: Duration,
    /// Total time elapsed since the clock started, in seconds.
    pub elapsed_seconds: f32,
    /// Instantaneous framerate derived from `delta`; 0.0 when `delta` is zero.
    pub framerate: f32,
}

impl FrameSample {
    /// Frame delta in milliseconds, for display sinks.
    pub fn delta_millis(&self) -> f32 {
        self.delta.as_secs_f32() * 1000.0
    }
}

/// Tracks wall-clock time between frames.
///
/// The clock is the sole time authority for the render loop: the same sample
/// that drives the framerate readout also feeds the shader's time uniform, so
/// the two can never drift apart.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    previous: Instant,
    elapsed: Duration,
}

impl FrameClock {
    /// Creates a clock whose origin is `Instant::now()`.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a clock with an explicit origin.
    pub fn starting_at(origin: Instant) -> Self {
        Self {
            previous: origin,
            elapsed: Duration::ZERO,
        }
    }

    /// Advances the clock to `Instant::now()`.
    pub fn tick(&mut self) -> FrameSample {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to the supplied instant.
    ///
    /// A tick at (or before) the previous instant reports a zero delta and a
    /// framerate of 0.0 rather than dividing by zero.
    pub fn tick_at(&mut self, now: Instant) -> FrameSample {
        let delta = now.saturating_duration_since(self.previous);
        self.previous = now;
        self.elapsed += delta;

        let framerate = if delta.is_zero() {
            0.0
        } else {
            1.0 / delta.as_secs_f32()
        };

        FrameSample {
            delta,
            elapsed_seconds: self.elapsed.as_secs_f32(),
            framerate,
        }
    }

    /// Total time accumulated across all ticks.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
