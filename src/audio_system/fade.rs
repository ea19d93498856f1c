/// Linear volume ramp
///
/// Drives fade-in on start and fade-out on stop. Ramps are advanced by the
/// periodic `tick`, never by a timer thread.
use std::time::{Duration, Instant};

/// Volume ramp between two native levels (0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    from: f32,
    to: f32,
    started: Instant,
    duration: Duration,
}

impl Ramp {
    /// Create a ramp starting at `started`
    pub fn new(from: f32, to: f32, started: Instant, duration: Duration) -> Self {
        Self {
            from: from.clamp(0.0, 1.0),
            to: to.clamp(0.0, 1.0),
            started,
            duration,
        }
    }

    /// Ramp from silence up to `to`
    pub fn fade_in(to: f32, started: Instant, duration: Duration) -> Self {
        Self::new(0.0, to, started, duration)
    }

    /// Ramp from `from` down to silence
    pub fn fade_out(from: f32, started: Instant, duration: Duration) -> Self {
        Self::new(from, 0.0, started, duration)
    }

    /// Fraction of the ramp completed at `now`, 0.0 to 1.0
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Level at `now`
    pub fn level_at(&self, now: Instant) -> f32 {
        self.from + (self.to - self.from) * self.progress(now)
    }

    /// Check whether the ramp has reached its target
    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Target level
    pub fn target(&self) -> f32 {
        self.to
    }
}
