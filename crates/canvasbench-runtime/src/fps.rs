//! Frame rate estimate

/// Counts frames and publishes a rate once per window (one second by default)
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: f64,
    frames: u32,
    elapsed: f64,
    fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::with_window(1.0)
    }
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(window: f64) -> Self {
        Self {
            window,
            frames: 0,
            elapsed: 0.0,
            fps: 0.0,
        }
    }

    /// Count one frame interval of `gap` seconds of wall time
    pub fn record(&mut self, gap: f64) {
        self.frames += 1;
        self.elapsed += gap;
        if self.elapsed >= self.window {
            self.fps = (self.frames as f64 / self.elapsed) as f32;
            self.frames = 0;
            self.elapsed = 0.0;
        }
    }

    /// Rate measured over the last complete window; 0 until one completes
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn reset(&mut self) {
        self.frames = 0;
        self.elapsed = 0.0;
        self.fps = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_until_first_window() {
        let mut fps = FpsCounter::new();
        for _ in 0..30 {
            fps.record(1.0 / 60.0);
        }
        assert_eq!(fps.fps(), 0.0);
    }

    #[test]
    fn sixty_frames_per_second() {
        let mut fps = FpsCounter::new();
        for _ in 0..120 {
            fps.record(1.0 / 60.0);
        }
        assert!((fps.fps() - 60.0).abs() < 1.5, "fps {}", fps.fps());
    }

    #[test]
    fn reset_clears_estimate() {
        let mut fps = FpsCounter::with_window(0.5);
        for _ in 0..40 {
            fps.record(0.025);
        }
        assert!(fps.fps() > 0.0);
        fps.reset();
        assert_eq!(fps.fps(), 0.0);
    }
}
