//! Synthetic hand landmarks for demos, tests and benchmarks.
//!
//! [`poses`] builds canonical hand shapes in normalized image coordinates.
//! [`SyntheticHandSource`] plays a looping script of those poses through the
//! [`LandmarkSource`] interface, standing in for a camera and a detection
//! model.

use crate::{
    app::LandmarkSource,
    landmarks::{HandLandmarkSet, Landmark},
    Error, Result,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;

/// Canonical hand poses
pub mod poses {
    use crate::constants::{
        INDEX_MCP, INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP, NUM_HAND_LANDMARKS, PINKY_MCP, PINKY_TIP, RING_MCP, RING_TIP,
        THUMB_CMC, THUMB_IP, THUMB_MCP, THUMB_TIP, WRIST,
    };
    use crate::landmarks::{HandLandmarkSet, Landmark};

    type Point = (f32, f32, f32);

    const OPEN_WRIST: Point = (0.5, 0.8, 0.0);
    const OPEN_THUMB_CMC: Point = (0.43, 0.75, 0.0);
    const OPEN_THUMB_MCP: Point = (0.37, 0.68, 0.0);
    const OPEN_INDEX_MCP: Point = (0.42, 0.6, 0.0);
    const OPEN_MIDDLE_MCP: Point = (0.5, 0.58, 0.0);
    const OPEN_RING_MCP: Point = (0.58, 0.6, 0.0);
    const OPEN_PINKY_MCP: Point = (0.64, 0.64, 0.0);

    /// Bases and tips of every finger; intermediate joints are interpolated
    #[derive(Debug, Clone, Copy)]
    struct HandSkeleton {
        wrist: Point,
        thumb_cmc: Point,
        thumb_mcp: Point,
        thumb_tip: Point,
        /// (MCP, tip) for index, middle, ring and pinky
        fingers: [(Point, Point); 4],
    }

    fn lerp(a: Point, b: Point, t: f32) -> Point {
        (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t, a.2 + (b.2 - a.2) * t)
    }

    impl HandSkeleton {
        fn open() -> Self {
            Self {
                wrist: OPEN_WRIST,
                thumb_cmc: OPEN_THUMB_CMC,
                thumb_mcp: OPEN_THUMB_MCP,
                thumb_tip: (0.25, 0.55, 0.0),
                fingers: [
                    (OPEN_INDEX_MCP, (0.38, 0.38, 0.0)),
                    (OPEN_MIDDLE_MCP, (0.5, 0.33, 0.0)),
                    (OPEN_RING_MCP, (0.62, 0.38, 0.0)),
                    (OPEN_PINKY_MCP, (0.74, 0.5, 0.0)),
                ],
            }
        }

        fn heart() -> Self {
            // 60° between thumb and index, 0.02 between their tips
            Self {
                wrist: OPEN_WRIST,
                thumb_cmc: (0.45, 0.76, 0.0),
                thumb_mcp: (0.40, 0.70, 0.0),
                thumb_tip: (0.50, 0.60, 0.0),
                fingers: [
                    ((0.5407, 0.6773, 0.0), (0.52, 0.60, 0.0)),
                    ((0.55, 0.62, 0.0), (0.52, 0.72, 0.0)),
                    ((0.58, 0.63, 0.0), (0.55, 0.73, 0.0)),
                    ((0.60, 0.66, 0.0), (0.58, 0.74, 0.0)),
                ],
            }
        }

        fn build(&self) -> HandLandmarkSet {
            let mut points = [Landmark::default(); NUM_HAND_LANDMARKS];
            let mut set = |idx: usize, p: Point| points[idx] = Landmark::new(p.0, p.1, p.2);

            set(WRIST, self.wrist);
            set(THUMB_CMC, self.thumb_cmc);
            set(THUMB_MCP, self.thumb_mcp);
            set(THUMB_IP, lerp(self.thumb_mcp, self.thumb_tip, 0.5));
            set(THUMB_TIP, self.thumb_tip);

            let bases = [INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];
            let tips = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
            for ((&base, &tip), &(mcp, end)) in bases.iter().zip(&tips).zip(&self.fingers) {
                set(base, mcp);
                set(base + 1, lerp(mcp, end, 1.0 / 3.0));
                set(base + 2, lerp(mcp, end, 2.0 / 3.0));
                set(tip, end);
            }
            HandLandmarkSet::new(points)
        }
    }

    /// Fully spread hand, palm toward the camera
    #[must_use]
    pub fn open_hand() -> HandLandmarkSet {
        HandSkeleton::open().build()
    }

    /// Closed fist; fingertips curled onto the palm
    #[must_use]
    pub fn fist() -> HandLandmarkSet {
        let mut hand = HandSkeleton::open();
        hand.thumb_tip = (0.42, 0.70, 0.0);
        hand.fingers[0].1 = (0.47, 0.66, 0.0);
        hand.fingers[1].1 = (0.5, 0.665, 0.0);
        hand.fingers[2].1 = (0.53, 0.67, 0.0);
        hand.fingers[3].1 = (0.555, 0.69, 0.0);
        hand.build()
    }

    /// Thumb and index forming half a heart, other fingers curled
    #[must_use]
    pub fn heart_hand() -> HandLandmarkSet {
        HandSkeleton::heart().build()
    }

    /// Open hand turned about the vertical axis (yaw ≈ 26°)
    #[must_use]
    pub fn tilted_hand() -> HandLandmarkSet {
        let mut hand = HandSkeleton::open();
        hand.fingers[3].0 .2 = 0.1;
        hand.build()
    }

    /// Open hand close to the camera, palm flat
    #[must_use]
    pub fn flat_palm() -> HandLandmarkSet {
        let mut hand = HandSkeleton::open();
        let grow = |p: Point| lerp(OPEN_WRIST, p, 1.3);
        hand.thumb_cmc = grow(hand.thumb_cmc);
        hand.thumb_mcp = grow(hand.thumb_mcp);
        hand.thumb_tip = grow(hand.thumb_tip);
        for finger in &mut hand.fingers {
            *finger = (grow(finger.0), grow(finger.1));
        }
        hand.build()
    }

    /// Heart pose with the thumb pulled away from the index tip
    #[must_use]
    pub fn heart_tips_apart() -> HandLandmarkSet {
        let mut hand = HandSkeleton::heart();
        let shift = |p: Point| (p.0 - 0.06, p.1, p.2);
        hand.thumb_cmc = shift(hand.thumb_cmc);
        hand.thumb_mcp = shift(hand.thumb_mcp);
        hand.thumb_tip = shift(hand.thumb_tip);
        hand.build()
    }

    /// Heart pose with the index running parallel to the thumb
    #[must_use]
    pub fn heart_parallel_fingers() -> HandLandmarkSet {
        let mut hand = HandSkeleton::heart();
        let tip = hand.fingers[0].1;
        let (dx, dy) = (hand.thumb_tip.0 - hand.thumb_mcp.0, hand.thumb_tip.1 - hand.thumb_mcp.1);
        let len = dx.hypot(dy);
        hand.fingers[0].0 = (tip.0 - dx / len * 0.08, tip.1 - dy / len * 0.08, 0.0);
        hand.build()
    }

    /// Heart pose with middle and ring fingers extended
    #[must_use]
    pub fn heart_fingers_extended() -> HandLandmarkSet {
        let mut hand = HandSkeleton::heart();
        hand.fingers[1].1 = (0.5, 0.3, 0.0);
        hand.fingers[2].1 = (0.6, 0.3, 0.0);
        hand.build()
    }
}

/// One step of a synthetic script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandPose {
    Open,
    Fist,
    Heart,
    Tilted,
    FlatPalm,
    /// No hand in view
    None,
}

impl HandPose {
    /// Landmarks for this pose, if a hand is visible
    #[must_use]
    pub fn landmarks(self) -> Option<HandLandmarkSet> {
        match self {
            Self::Open => Some(poses::open_hand()),
            Self::Fist => Some(poses::fist()),
            Self::Heart => Some(poses::heart_hand()),
            Self::Tilted => Some(poses::tilted_hand()),
            Self::FlatPalm => Some(poses::flat_palm()),
            Self::None => None,
        }
    }
}

/// Canned scripts for the demo binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Open, fist, heart, tilted, flat palm and an empty stretch, looping
    Cycle,
    Open,
    Fist,
    Heart,
    /// No hand at all
    Idle,
}

impl Scenario {
    /// Script of `(pose, video frames)` segments
    #[must_use]
    pub fn script(self) -> Vec<(HandPose, u32)> {
        match self {
            Self::Cycle => vec![
                (HandPose::Open, 90),
                (HandPose::Fist, 90),
                (HandPose::Heart, 120),
                (HandPose::Tilted, 90),
                (HandPose::FlatPalm, 60),
                (HandPose::None, 60),
            ],
            Self::Open => vec![(HandPose::Open, 1)],
            Self::Fist => vec![(HandPose::Fist, 1)],
            Self::Heart => vec![(HandPose::Heart, 1)],
            Self::Idle => vec![(HandPose::None, 1)],
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cycle => "cycle",
            Self::Open => "open",
            Self::Fist => "fist",
            Self::Heart => "heart",
            Self::Idle => "idle",
        })
    }
}

impl FromStr for Scenario {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cycle" => Ok(Self::Cycle),
            "open" => Ok(Self::Open),
            "fist" => Ok(Self::Fist),
            "heart" => Ok(Self::Heart),
            "idle" | "none" => Ok(Self::Idle),
            _ => Err(Error::InvalidInput(format!(
                "Unknown scenario: {s}. Available: cycle, open, fist, heart, idle"
            ))),
        }
    }
}

/// Scripted landmark source
///
/// Each display tick polls [`LandmarkSource::current_frame`]; a new video
/// frame identity appears every `ticks_per_frame` polls, so a display running
/// faster than the camera sees duplicate frames.
#[derive(Debug, Clone)]
pub struct SyntheticHandSource {
    script: Vec<(HandPose, u32)>,
    script_frames: u64,
    ticks_per_frame: u32,
    warmup_ticks: u32,
    ticks: u64,
    noise: f32,
    fail_every: Option<u64>,
    detections: u64,
    rng: StdRng,
}

impl SyntheticHandSource {
    /// Create a source playing `script` in a loop
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the script is empty or has no frames
    pub fn new(script: Vec<(HandPose, u32)>) -> Result<Self> {
        let script_frames: u64 = script.iter().map(|&(_, frames)| u64::from(frames)).sum();
        if script_frames == 0 {
            return Err(Error::InvalidInput("Synthetic script must contain at least one frame".to_string()));
        }
        Ok(Self {
            script,
            script_frames,
            ticks_per_frame: 1,
            warmup_ticks: 0,
            ticks: 0,
            noise: 0.0,
            fail_every: None,
            detections: 0,
            rng: StdRng::seed_from_u64(0),
        })
    }

    /// Source playing a canned scenario
    ///
    /// # Errors
    ///
    /// Never fails for the built-in scenarios
    pub fn scenario(scenario: Scenario) -> Result<Self> {
        Self::new(scenario.script())
    }

    /// Hold each video frame for `ticks` display ticks
    #[must_use]
    pub fn with_ticks_per_frame(mut self, ticks: u32) -> Self {
        self.ticks_per_frame = ticks.max(1);
        self
    }

    /// Report "video not ready" for the first `ticks` polls
    #[must_use]
    pub fn with_warmup(mut self, ticks: u32) -> Self {
        self.warmup_ticks = ticks;
        self
    }

    /// Add uniform landmark noise of the given amplitude
    #[must_use]
    pub fn with_noise(mut self, amplitude: f32, seed: u64) -> Self {
        self.noise = amplitude.max(0.0);
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Fail every `n`-th detection with a detection error
    #[must_use]
    pub fn with_failure_every(mut self, n: u64) -> Self {
        self.fail_every = (n > 0).then_some(n);
        self
    }

    /// Pose shown in a video frame
    #[must_use]
    pub fn pose_at(&self, frame: u64) -> HandPose {
        let mut offset = frame % self.script_frames;
        for &(pose, frames) in &self.script {
            let frames = u64::from(frames);
            if offset < frames {
                return pose;
            }
            offset -= frames;
        }
        HandPose::None
    }

    fn perturb(&mut self, hand: HandLandmarkSet) -> Result<HandLandmarkSet> {
        if self.noise <= 0.0 {
            return Ok(hand);
        }
        let noise = self.noise;
        let points: Vec<Landmark> = hand
            .points()
            .iter()
            .map(|p| {
                Landmark::new(
                    p.x + self.rng.gen_range(-noise..=noise),
                    p.y + self.rng.gen_range(-noise..=noise),
                    p.z + self.rng.gen_range(-noise..=noise),
                )
            })
            .collect();
        HandLandmarkSet::from_slice(&points)
    }
}

impl LandmarkSource for SyntheticHandSource {
    fn current_frame(&mut self) -> Option<u64> {
        let tick = self.ticks;
        self.ticks += 1;
        let warmup = u64::from(self.warmup_ticks);
        if tick < warmup {
            return None;
        }
        Some((tick - warmup) / u64::from(self.ticks_per_frame))
    }

    fn detect(&mut self, frame: u64) -> Result<Vec<HandLandmarkSet>> {
        self.detections += 1;
        if self.fail_every.is_some_and(|n| self.detections % n == 0) {
            return Err(Error::DetectionError(format!("Synthetic failure on frame {frame}")));
        }
        match self.pose_at(frame).landmarks() {
            Some(hand) => Ok(vec![self.perturb(hand)?]),
            None => Ok(Vec::new()),
        }
    }
}
