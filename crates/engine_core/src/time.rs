//! Time management for the animation loop.

use std::time::{Duration, Instant};

/// Frame clock: elapsed time since the loop started and the last frame's delta.
///
/// Instants are passed in rather than sampled so callers (and tests) control
/// the timeline.
#[derive(Debug, Clone)]
pub struct Time {
    /// Time when the loop started.
    start_time: Instant,
    /// Time of the last frame.
    last_frame: Instant,
    /// Duration of the last frame.
    delta: Duration,
    /// Total elapsed time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
}

impl Time {
    /// Create a clock that starts at `now`.
    pub fn starting_at(now: Instant) -> Self {
        Self {
            start_time: now,
            last_frame: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Update timing at the start of a new frame. Instants earlier than the
    /// previous frame count as a zero-length frame.
    pub fn update(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.last_frame);
        if now > self.last_frame {
            self.last_frame = now;
        }
        self.elapsed = self.last_frame - self.start_time;
        self.frame_count += 1;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get total elapsed time as Duration.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_and_delta_track_updates() {
        let t0 = Instant::now();
        let mut time = Time::starting_at(t0);
        time.update(t0 + Duration::from_millis(16));
        time.update(t0 + Duration::from_millis(40));
        assert_eq!(time.frame_count(), 2);
        assert_eq!(time.elapsed(), Duration::from_millis(40));
        assert!((time.delta_seconds() - 0.024).abs() < 1e-6);
    }

    #[test]
    fn stale_instant_is_zero_delta() {
        let t0 = Instant::now();
        let mut time = Time::starting_at(t0 + Duration::from_millis(10));
        time.update(t0);
        assert_eq!(time.delta_seconds(), 0.0);
        assert_eq!(time.elapsed(), Duration::ZERO);
    }
}
