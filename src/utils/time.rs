#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Monotonic timer measuring time since creation and between frames.
pub struct FrameTimer {
    start_time: Instant,
    /// Elapsed seconds at the last [`FrameTimer::tick`]
    last_frame_time: f64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    /// Creates a new timer starting from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            last_frame_time: 0.0,
        }
    }

    /// Seconds elapsed since the timer was created.
    #[must_use]
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Advances the timer, returning `(frame_time, delta)` in seconds.
    ///
    /// `frame_time` is the time since creation; `delta` is the time since
    /// the previous tick (or since creation for the first tick).
    pub fn tick(&mut self) -> (f64, f32) {
        let frame_time = self.elapsed_time();
        let delta = (frame_time - self.last_frame_time) as f32;
        self.last_frame_time = frame_time;
        (frame_time, delta)
    }
}
