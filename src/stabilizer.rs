//! Temporal stabilization of gesture metrics.
//!
//! The [`TemporalStabilizer`] owns the session's [`StableGestureSignal`]. Each
//! distinct video frame passes through a [`FrameGate`]; admitted frames run
//! detection and analysis, and every continuous channel is blended toward its
//! raw value with an exponential smoother. When no hand is visible the
//! strength decays toward zero while rotation and distance hold their last
//! stable values.

use crate::{
    analyzer::{GestureThresholds, LandmarkAnalyzer, RawGestureMetrics, Rotation},
    constants::NO_HAND_NOTICE_FRAMES,
    device::{DeviceProfile, SmoothingFactors},
    filters::{ExponentialSmoother, HysteresisLatch, RotationSmoother},
    landmarks::HandLandmarkSet,
    Error, Result,
};

/// Smoothed interaction signal consumed by the animator and display
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StableGestureSignal {
    /// Smoothed openness in `[0, 1]`
    pub strength: f32,
    pub rotation: Rotation,
    /// Smoothed distance in `[0, 1]` (0 = near)
    pub distance: f32,
    pub is_facing_camera: bool,
    pub is_heart_gesture: bool,
    /// First detected hand of the last processed frame
    pub landmarks: Option<HandLandmarkSet>,
    pub hand_present: bool,
}

impl StableGestureSignal {
    /// Strength as a rounded percentage for display
    #[must_use]
    pub fn strength_percent(&self) -> u8 {
        crate::utils::safe_cast::f32_to_u8_clamp(self.strength * 100.0)
    }
}

/// What happened to one frame offered to the stabilizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Same frame identity as the previous call; nothing ran
    Duplicate,
    /// Distinct frame skipped by decimation; nothing ran
    Decimated,
    /// Detection ran and the signal was updated
    Updated { hand_detected: bool },
}

/// Duplicate-frame and decimation gate
#[derive(Debug, Clone)]
pub struct FrameGate {
    decimation: u32,
    last_frame: Option<u64>,
    distinct_frames: u64,
}

impl FrameGate {
    /// Create a gate admitting every `decimation`-th distinct frame
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `decimation` is zero
    pub fn new(decimation: u32) -> Result<Self> {
        if decimation == 0 {
            return Err(Error::InvalidInput("Decimation must be at least 1".to_string()));
        }
        Ok(Self {
            decimation,
            last_frame: None,
            distinct_frames: 0,
        })
    }

    /// Offer a frame; `None` means it should be processed
    pub fn admit(&mut self, frame_id: u64) -> Option<FrameOutcome> {
        if self.last_frame == Some(frame_id) {
            return Some(FrameOutcome::Duplicate);
        }
        self.last_frame = Some(frame_id);
        self.distinct_frames += 1;

        if self.distinct_frames % u64::from(self.decimation) == 0 {
            None
        } else {
            Some(FrameOutcome::Decimated)
        }
    }

    /// Distinct frames seen so far
    #[must_use]
    pub fn distinct_frames(&self) -> u64 {
        self.distinct_frames
    }

    #[must_use]
    pub fn decimation(&self) -> u32 {
        self.decimation
    }
}

/// Owns the stable signal and its per-channel smoothers
#[derive(Debug, Clone)]
pub struct TemporalStabilizer {
    analyzer: LandmarkAnalyzer,
    gate: FrameGate,
    strength: ExponentialSmoother,
    rotation: RotationSmoother,
    distance: ExponentialSmoother,
    no_hand_decay: f32,
    heart: HysteresisLatch,
    signal: StableGestureSignal,
    last_raw: Option<RawGestureMetrics>,
    empty_frames: u64,
}

impl TemporalStabilizer {
    /// Create a stabilizer from a device profile
    ///
    /// # Errors
    ///
    /// Returns `Error::FilterError` if any smoothing factor is outside `(0, 1]`
    /// and `Error::InvalidInput` for a zero decimation
    pub fn new(
        profile: &DeviceProfile,
        analyzer: LandmarkAnalyzer,
        heart_rise_frames: u32,
        heart_fall_frames: u32,
    ) -> Result<Self> {
        let factors = profile.smoothing;
        factors.validate()?;
        log::info!(
            "Stabilizer ready: decimation {}, strength factor {}, rotation factor {}",
            profile.decimation,
            factors.strength,
            factors.rotation
        );

        Ok(Self {
            analyzer,
            gate: FrameGate::new(profile.decimation)?,
            strength: ExponentialSmoother::new(factors.strength)?,
            rotation: RotationSmoother::new(factors.rotation, factors.rotation_facing)?,
            distance: ExponentialSmoother::new(factors.distance)?,
            no_hand_decay: factors.no_hand_decay,
            heart: HysteresisLatch::new(heart_rise_frames, heart_fall_frames),
            signal: StableGestureSignal::default(),
            last_raw: None,
            empty_frames: 0,
        })
    }

    /// Gate a video frame and, if admitted, run `detect` and update
    ///
    /// `detect` is only called for admitted frames; it returns every hand
    /// found in the frame, of which only the first is used.
    pub fn process_frame<F>(&mut self, frame_id: u64, detect: F) -> FrameOutcome
    where
        F: FnOnce() -> Vec<HandLandmarkSet>,
    {
        if let Some(skipped) = self.gate.admit(frame_id) {
            return skipped;
        }
        let hands = detect();
        self.update(&hands);
        FrameOutcome::Updated {
            hand_detected: !hands.is_empty(),
        }
    }

    /// Apply one processed detection result
    pub fn update(&mut self, hands: &[HandLandmarkSet]) {
        match hands.first() {
            Some(hand) => self.update_with_hand(hand),
            None => self.update_without_hand(),
        }
    }

    fn update_with_hand(&mut self, hand: &HandLandmarkSet) {
        let raw = self.analyzer.analyze(hand);

        self.signal.strength = self.strength.update(raw.openness_raw);
        self.signal.rotation = self.rotation.update(raw.rotation, raw.is_facing_camera);
        self.signal.distance = self.distance.update(raw.distance_raw);
        self.signal.is_facing_camera = raw.is_facing_camera;

        let was_heart = self.signal.is_heart_gesture;
        self.signal.is_heart_gesture = self.heart.update(raw.is_heart_gesture);
        if self.signal.is_heart_gesture != was_heart {
            if self.signal.is_heart_gesture {
                log::info!("Heart gesture detected");
            } else {
                log::info!("Heart gesture released");
            }
        }

        self.signal.landmarks = Some(hand.clone());
        self.signal.hand_present = true;
        self.last_raw = Some(raw);
        self.empty_frames = 0;

        log::trace!(
            "raw openness {:.3} distance {:.3} facing {} | stable strength {:.3} yaw {:.1}",
            raw.openness_raw,
            raw.distance_raw,
            raw.is_facing_camera,
            self.signal.strength,
            self.signal.rotation.yaw
        );
    }

    fn update_without_hand(&mut self) {
        self.signal.strength = self.strength.update_with(0.0, self.no_hand_decay);

        if self.signal.is_heart_gesture {
            log::info!("Heart gesture released (hand lost)");
        }
        self.heart.reset();
        self.signal.is_heart_gesture = false;
        self.signal.is_facing_camera = false;
        self.signal.landmarks = None;
        self.signal.hand_present = false;
        self.last_raw = None;

        self.empty_frames += 1;
        if self.empty_frames % NO_HAND_NOTICE_FRAMES == 0 {
            log::info!("No hand detected, place a hand in front of the camera");
        }
    }

    /// Current stable signal
    #[must_use]
    pub fn signal(&self) -> &StableGestureSignal {
        &self.signal
    }

    /// Owned copy of the current signal
    #[must_use]
    pub fn snapshot(&self) -> StableGestureSignal {
        self.signal.clone()
    }

    /// Raw metrics from the last frame with a hand
    #[must_use]
    pub fn last_raw(&self) -> Option<&RawGestureMetrics> {
        self.last_raw.as_ref()
    }

    /// Smoothing factors currently in effect
    #[must_use]
    pub fn factors(&self) -> SmoothingFactors {
        SmoothingFactors {
            strength: self.strength.factor(),
            rotation: self.rotation.factor(),
            rotation_facing: self.rotation.facing_factor(),
            distance: self.distance.factor(),
            no_hand_decay: self.no_hand_decay,
        }
    }

    #[must_use]
    pub fn decimation(&self) -> u32 {
        self.gate.decimation()
    }

    /// Replace the smoothing factors, keeping the stable values
    ///
    /// # Errors
    ///
    /// Returns `Error::FilterError` if any factor is outside `(0, 1]`; the
    /// previous factors stay in effect
    pub fn set_factors(&mut self, factors: SmoothingFactors) -> Result<()> {
        factors.validate()?;
        self.strength.set_factor(factors.strength)?;
        self.rotation.set_factors(factors.rotation, factors.rotation_facing)?;
        self.distance.set_factor(factors.distance)?;
        self.no_hand_decay = factors.no_hand_decay;
        Ok(())
    }

    /// Replace the gesture thresholds used for analysis
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for inconsistent thresholds; the previous
    /// analyzer stays in effect
    pub fn set_thresholds(&mut self, thresholds: GestureThresholds) -> Result<()> {
        thresholds.validate()?;
        self.analyzer = LandmarkAnalyzer::new(thresholds);
        Ok(())
    }

    #[must_use]
    pub fn thresholds(&self) -> &GestureThresholds {
        self.analyzer.thresholds()
    }

    /// Change the detection decimation, restarting the frame count
    ///
    /// The last seen frame is kept, so a repeat of it is still a duplicate.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `decimation` is zero
    pub fn set_decimation(&mut self, decimation: u32) -> Result<()> {
        let mut gate = FrameGate::new(decimation)?;
        gate.last_frame = self.gate.last_frame;
        self.gate = gate;
        Ok(())
    }
}
