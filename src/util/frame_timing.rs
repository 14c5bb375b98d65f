use web_time::{Duration, Instant};

/// Smoothed frame-rate counter for rendered frames.
///
/// Only frames that were actually drawn are counted, so an idle
/// render-on-demand viewer reports the rate of its last burst rather than
/// the animation-frame rate.
#[derive(Debug, Clone)]
pub struct FrameTiming {
    /// Last rendered frame timestamp (`None` before the first frame).
    last_frame: Option<Instant>,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
    /// Total rendered frames.
    frames: u64,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTiming {
    /// Gaps longer than this restart the average instead of dragging it
    /// towards zero.
    const IDLE_GAP: Duration = Duration::from_millis(500);

    /// Create a new frame counter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_frame: None,
            smoothed_fps: 60.0, // Start with reasonable default
            smoothing: 0.05,    /* 5% new value, 95% old value for smooth
                                 * display */
            frames: 0,
        }
    }

    /// Record a rendered frame at `now`.
    pub fn record_frame(&mut self, now: Instant) {
        self.frames += 1;
        let Some(last) = self.last_frame.replace(now) else {
            return;
        };
        let elapsed = now.saturating_duration_since(last);
        if elapsed > Self::IDLE_GAP {
            return;
        }

        let frame_time = elapsed.as_secs_f32();
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            // Exponential moving average for smooth display
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
    }

    /// Get the current FPS (smoothed)
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }

    /// Number of frames rendered so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_frames() {
        let mut timing = FrameTiming::new();
        let start = Instant::now();
        timing.record_frame(start);
        timing.record_frame(start + Duration::from_millis(16));
        assert_eq!(timing.frames(), 2);
    }

    #[test]
    fn average_moves_towards_measured_rate() {
        let mut timing = FrameTiming::new();
        let start = Instant::now();
        for i in 0..200 {
            timing.record_frame(start + Duration::from_millis(i * 33));
        }
        assert!((timing.fps() - 30.3).abs() < 1.0, "fps {}", timing.fps());
    }

    #[test]
    fn idle_gap_does_not_tank_average() {
        let mut timing = FrameTiming::new();
        let start = Instant::now();
        timing.record_frame(start);
        timing.record_frame(start + Duration::from_secs(10));
        assert_eq!(timing.fps(), 60.0);
    }
}
