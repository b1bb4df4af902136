//! Detection frame-rate tracking.
//!
//! Counts processed detection frames and recomputes the rate once per
//! second, the way a status overlay would sample it.

use crate::constants::{FPS_FAIR, FPS_GOOD};
use std::fmt;

/// Coarse health of the detection rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpsStatus {
    Good,
    Fair,
    Poor,
}

impl FpsStatus {
    /// Classify a frame rate
    #[must_use]
    pub fn classify(fps: f64) -> Self {
        if fps >= FPS_GOOD {
            Self::Good
        } else if fps >= FPS_FAIR {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

impl fmt::Display for FpsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        })
    }
}

/// Frame counter with a one-second measurement window
#[derive(Debug, Clone, Default)]
pub struct FrameRateMonitor {
    window_start: Option<f64>,
    frames_in_window: u32,
    fps: f64,
}

impl FrameRateMonitor {
    /// Create a monitor reporting 0 FPS until the first window closes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one processed frame at `now` (seconds)
    ///
    /// The first call only opens the window. Returns the new rate when a
    /// measurement window closed.
    pub fn record(&mut self, now: f64) -> Option<f64> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            return None;
        };
        self.frames_in_window += 1;

        let elapsed = now - start;
        if elapsed >= 1.0 {
            self.fps = (f64::from(self.frames_in_window) / elapsed).round();
            self.frames_in_window = 0;
            self.window_start = Some(now);
            return Some(self.fps);
        }
        None
    }

    /// Last measured rate
    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    #[must_use]
    pub fn status(&self) -> FpsStatus {
        FpsStatus::classify(self.fps)
    }

    /// Forget all measurements
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
