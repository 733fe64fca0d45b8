//! Variable-step frame clock.

use std::time::Instant;

use tracing::warn;

/// Longest frame step fed to the animation; longer stalls are clamped.
pub const MAX_FRAME_TIME: f32 = 0.25;

/// Measures wall-clock time between redraws.
#[derive(Debug, Clone)]
pub struct FrameClock {
    previous: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self { previous: start }
    }

    /// Seconds since the previous tick, clamped to [`MAX_FRAME_TIME`].
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = now.saturating_duration_since(self.previous).as_secs_f32();
        self.previous = now;
        if dt > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                dt * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            return MAX_FRAME_TIME;
        }
        dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_tick_measures_elapsed() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-6);
        let dt = clock.tick_at(start + Duration::from_millis(48));
        assert!((dt - 0.032).abs() < 1e-6);
    }

    #[test]
    fn test_long_frame_clamped() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.tick_at(start + Duration::from_secs(3)), MAX_FRAME_TIME);
    }

    #[test]
    fn test_backwards_time_is_zero() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.tick_at(start - Duration::from_millis(5)), 0.0);
    }
}
