//! Frame clock with stall clamping

use log::warn;
use std::time::Instant;

/// Largest delta handed to the simulation, in seconds. A longer gap (window
/// dragged, process suspended) is integrated as this much time.
pub const MAX_FRAME_DELTA: f64 = 0.25;

/// Turns frame timestamps into deltas
#[derive(Default)]
pub struct FrameClock {
    /// Clamped time since last frame in seconds
    pub delta_time: f64,
    /// Unclamped wall time since last frame; `None` on the first tick
    pub frame_gap: Option<f64>,
    last_instant: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock to `now` and return the clamped delta. The first
    /// tick after construction or `reset` yields 0.
    pub fn tick(&mut self, now: Instant) -> f64 {
        let Some(last) = self.last_instant.replace(now) else {
            self.delta_time = 0.0;
            self.frame_gap = None;
            return 0.0;
        };

        let elapsed = now.saturating_duration_since(last).as_secs_f64();
        if elapsed > MAX_FRAME_DELTA {
            warn!(
                "frame gap of {:.0}ms clamped to {:.0}ms",
                elapsed * 1000.0,
                MAX_FRAME_DELTA * 1000.0
            );
        }
        self.frame_gap = Some(elapsed);
        self.delta_time = elapsed.min(MAX_FRAME_DELTA);
        self.delta_time
    }

    /// Forget the previous timestamp so the next tick starts fresh
    pub fn reset(&mut self) {
        self.last_instant = None;
        self.delta_time = 0.0;
        self.frame_gap = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_tick_zero_delta() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(Instant::now()), 0.0);
        assert_eq!(clock.frame_gap, None);
    }

    #[test]
    fn test_delta_between_ticks() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick(start);
        let dt = clock.tick(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-9);
        assert_eq!(clock.frame_gap, Some(dt));
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick(start);
        let dt = clock.tick(start + Duration::from_secs(3));
        assert_eq!(dt, MAX_FRAME_DELTA);
        // the real gap is kept for frame-rate measurement
        assert_eq!(clock.frame_gap, Some(3.0));
    }

    #[test]
    fn test_backwards_timestamp_is_zero() {
        let mut clock = FrameClock::new();
        let start = Instant::now() + Duration::from_secs(1);
        clock.tick(start);
        assert_eq!(clock.tick(start - Duration::from_millis(500)), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick(start);
        clock.reset();
        assert_eq!(clock.tick(start + Duration::from_millis(100)), 0.0);
    }
}
