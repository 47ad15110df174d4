//! Monotonic time source used for every expiry comparison.
//!
//! The engine never reads wall-clock time. Hosts implement [`Clock`] over
//! their own frame timer (seconds elapsed since process start).

/// Read-only view of the host's monotonic clock.
pub trait Clock {
    /// Seconds elapsed since the clock started.
    fn now(&self) -> f32;

    /// Duration of the current frame in seconds.
    fn delta(&self) -> f32 {
        0.0
    }
}

/// Clock advanced explicitly by the caller.
///
/// Used by tests and offline simulation where frames are scripted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ManualClock {
    now: f32,
    delta: f32,
}

impl ManualClock {
    pub const fn new(now: f32) -> Self {
        Self { now, delta: 0.0 }
    }

    /// Jump to an absolute time. The frame delta is left unchanged.
    pub fn set(&mut self, now: f32) {
        self.now = now;
    }

    /// Advance by one frame of length `dt`.
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.now += dt;
        self.delta = dt;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f32 {
        self.now
    }

    fn delta(&self) -> f32 {
        self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_frame_delta() {
        let mut clock = ManualClock::new(1.0);
        clock.advance(0.25);
        assert_eq!(clock.now(), 1.25);
        assert_eq!(clock.delta(), 0.25);

        clock.advance(-3.0);
        assert_eq!(clock.now(), 1.25);
        assert_eq!(clock.delta(), 0.0);
    }
}
