//! Landmark geometry analysis.
//!
//! Converts one [`HandLandmarkSet`] into [`RawGestureMetrics`]: an openness
//! strength, the palm's orientation, its apparent distance from the camera and
//! a discrete "heart" gesture flag. Analysis is pure and stateless; temporal
//! smoothing happens later in the stabilizer.
//!
//! Degenerate geometry never produces an error. Zero-length vectors collapse
//! to neutral values (zero normal, zero angle) and non-finite intermediates
//! collapse to zero.

use crate::{
    constants::{
        CURLED_FINGERTIPS, DEFAULT_BENT_FINGER_DISTANCE, DEFAULT_FACING_THRESHOLD, DEFAULT_HEART_MAX_ANGLE,
        DEFAULT_HEART_MIN_ANGLE, DEFAULT_HEART_TIP_DISTANCE, DEFAULT_MIN_BENT_FINGERS, DEFAULT_PALM_WIDTH_FAR,
        DEFAULT_PALM_WIDTH_NEAR, DISPERSION_OFFSET, DISPERSION_RANGE, DISPERSION_WEIGHT, EPSILON, FINGERTIPS,
        INDEX_MCP, INDEX_TIP, OPENNESS_EXPONENT, PINKY_MCP, SPAN_OFFSET, SPAN_RANGE, SPAN_WEIGHT, SPREAD_OFFSET,
        SPREAD_RANGE, SPREAD_WEIGHT, THUMB_MCP, THUMB_TIP, WRIST,
    },
    landmarks::HandLandmarkSet,
    Error, Result,
};
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Palm rotation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotation {
    /// The neutral orientation
    pub const ZERO: Self = Self { pitch: 0.0, yaw: 0.0, roll: 0.0 };

    /// Create a rotation from its three angles (degrees)
    #[must_use]
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }
}

/// Unsmoothed per-frame gesture measurements
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawGestureMetrics {
    /// How open the hand is, in `[0, 1]`
    pub openness_raw: f32,
    /// Palm rotation; exactly zero when facing the camera
    pub rotation: Rotation,
    /// Apparent distance, 0 = near and 1 = far
    pub distance_raw: f32,
    pub is_facing_camera: bool,
    pub is_heart_gesture: bool,
}

/// Tunable thresholds for the gesture rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    /// Palm normal z-component above which the palm faces the camera
    pub facing_threshold: f32,
    /// Palm width (normalized) that maps to distance 0
    pub palm_width_near: f32,
    /// Palm width (normalized) that maps to distance 1
    pub palm_width_far: f32,
    /// Maximum thumb-tip to index-tip distance for a heart
    pub heart_tip_distance: f32,
    /// Exclusive lower bound of the thumb/index angle, degrees
    pub heart_min_angle: f32,
    /// Exclusive upper bound of the thumb/index angle, degrees
    pub heart_max_angle: f32,
    /// A fingertip closer than this to the wrist counts as bent
    pub bent_finger_distance: f32,
    /// Minimum number of bent fingers for a heart
    pub min_bent_fingers: usize,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            facing_threshold: DEFAULT_FACING_THRESHOLD,
            palm_width_near: DEFAULT_PALM_WIDTH_NEAR,
            palm_width_far: DEFAULT_PALM_WIDTH_FAR,
            heart_tip_distance: DEFAULT_HEART_TIP_DISTANCE,
            heart_min_angle: DEFAULT_HEART_MIN_ANGLE,
            heart_max_angle: DEFAULT_HEART_MAX_ANGLE,
            bent_finger_distance: DEFAULT_BENT_FINGER_DISTANCE,
            min_bent_fingers: DEFAULT_MIN_BENT_FINGERS,
        }
    }
}

impl GestureThresholds {
    /// Validate threshold ordering and ranges
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for inverted or out-of-range thresholds
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.facing_threshold) {
            return Err(Error::ConfigError(format!(
                "facing_threshold must be in [0, 1], got {}",
                self.facing_threshold
            )));
        }
        if !(self.palm_width_near > self.palm_width_far && self.palm_width_far >= 0.0) {
            return Err(Error::ConfigError(format!(
                "palm_width_near ({}) must exceed palm_width_far ({}) and both must be non-negative",
                self.palm_width_near, self.palm_width_far
            )));
        }
        if self.heart_tip_distance <= 0.0 || self.bent_finger_distance <= 0.0 {
            return Err(Error::ConfigError(
                "heart_tip_distance and bent_finger_distance must be positive".to_string(),
            ));
        }
        if !(0.0..=180.0).contains(&self.heart_min_angle)
            || !(0.0..=180.0).contains(&self.heart_max_angle)
            || self.heart_min_angle >= self.heart_max_angle
        {
            return Err(Error::ConfigError(format!(
                "Heart angle window ({}, {}) must be ordered and within [0, 180]",
                self.heart_min_angle, self.heart_max_angle
            )));
        }
        if self.min_bent_fingers > CURLED_FINGERTIPS.len() {
            return Err(Error::ConfigError(format!(
                "min_bent_fingers must be at most {}, got {}",
                CURLED_FINGERTIPS.len(),
                self.min_bent_fingers
            )));
        }
        Ok(())
    }
}

/// Palm plane orientation derived from the wrist, index MCP and pinky MCP
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PalmOrientation {
    /// Unit palm normal, or the zero vector for a degenerate palm
    pub normal: Vector3<f32>,
    pub rotation: Rotation,
    pub is_facing_camera: bool,
}

/// Intermediate measurements of the heart gesture rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartReading {
    /// Thumb-tip to index-tip distance in the image plane
    pub tip_distance: f32,
    /// Angle between the thumb and index directions, degrees
    pub angle_deg: f32,
    /// Number of middle/ring/pinky tips curled toward the wrist
    pub bent_fingers: usize,
    pub is_heart: bool,
}

/// Stateless analyzer carrying its gesture thresholds
#[derive(Debug, Clone, Default)]
pub struct LandmarkAnalyzer {
    thresholds: GestureThresholds,
}

impl LandmarkAnalyzer {
    /// Create an analyzer with custom thresholds
    #[must_use]
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds in use
    #[must_use]
    pub fn thresholds(&self) -> &GestureThresholds {
        &self.thresholds
    }

    /// Compute all raw metrics for one hand
    #[must_use]
    pub fn analyze(&self, hand: &HandLandmarkSet) -> RawGestureMetrics {
        let orientation = palm_orientation(hand, self.thresholds.facing_threshold);
        let heart = heart_gesture(hand, &self.thresholds);

        RawGestureMetrics {
            openness_raw: openness_strength(hand),
            rotation: orientation.rotation,
            distance_raw: palm_distance(hand, self.thresholds.palm_width_near, self.thresholds.palm_width_far),
            is_facing_camera: orientation.is_facing_camera,
            is_heart_gesture: heart.is_heart,
        }
    }
}

/// Compute raw metrics with the default thresholds
#[must_use]
pub fn analyze(hand: &HandLandmarkSet) -> RawGestureMetrics {
    LandmarkAnalyzer::default().analyze(hand)
}

fn normalized_score(value: f32, offset: f32, range: f32) -> f32 {
    finite_or_zero((value - offset) / range).clamp(0.0, 1.0)
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn planar(hand: &HandLandmarkSet, idx: usize) -> Vector2<f32> {
    Vector2::new(hand[idx].x, hand[idx].y)
}

/// Openness strength in `[0, 1]`
///
/// Combines three normalized cues: the mean 3D fingertip-to-wrist distance,
/// the widest 2D fingertip span, and the mean 2D fingertip distance from
/// their centroid.
#[must_use]
pub fn openness_strength(hand: &HandLandmarkSet) -> f32 {
    let wrist = hand[WRIST];
    let tips: Vec<Vector2<f32>> = FINGERTIPS.iter().map(|&idx| planar(hand, idx)).collect();

    let avg_spread = FINGERTIPS.iter().map(|&idx| hand[idx].distance(wrist)).sum::<f32>() / FINGERTIPS.len() as f32;

    let mut max_span = 0.0_f32;
    for (i, a) in tips.iter().enumerate() {
        for b in &tips[i + 1..] {
            max_span = max_span.max((a - b).norm());
        }
    }

    let centroid = tips.iter().fold(Vector2::zeros(), |acc, t| acc + t) / tips.len() as f32;
    let dispersion = tips.iter().map(|t| (t - centroid).norm()).sum::<f32>() / tips.len() as f32;

    let combined = SPREAD_WEIGHT * normalized_score(avg_spread, SPREAD_OFFSET, SPREAD_RANGE)
        + SPAN_WEIGHT * normalized_score(max_span, SPAN_OFFSET, SPAN_RANGE)
        + DISPERSION_WEIGHT * normalized_score(dispersion, DISPERSION_OFFSET, DISPERSION_RANGE);

    finite_or_zero(combined.clamp(0.0, 1.0).powf(OPENNESS_EXPONENT)).clamp(0.0, 1.0)
}

/// Palm normal, Euler angles and facing state
///
/// When the normal's z-component exceeds `facing_threshold` the palm is
/// considered to face the camera and all three angles are reported as zero.
#[must_use]
pub fn palm_orientation(hand: &HandLandmarkSet, facing_threshold: f32) -> PalmOrientation {
    let wrist = hand[WRIST].to_vector();
    let edge1 = hand[INDEX_MCP].to_vector() - wrist;
    let edge2 = hand[PINKY_MCP].to_vector() - wrist;

    let cross = edge1.cross(&edge2);
    let length = cross.norm();
    let normal = if length.is_finite() && length > EPSILON {
        cross / length
    } else {
        Vector3::zeros()
    };

    let is_facing_camera = normal.z > facing_threshold;
    let rotation = if is_facing_camera {
        Rotation::ZERO
    } else {
        Rotation {
            pitch: finite_or_zero(normal.y.atan2(normal.z).to_degrees()),
            yaw: finite_or_zero((-normal.x).atan2(normal.y.hypot(normal.z)).to_degrees()),
            roll: finite_or_zero(edge1.y.atan2(edge1.x).to_degrees()),
        }
    };

    PalmOrientation {
        normal,
        rotation,
        is_facing_camera,
    }
}

/// Apparent palm distance in `[0, 1]` from the index-to-pinky MCP width
#[must_use]
pub fn palm_distance(hand: &HandLandmarkSet, near: f32, far: f32) -> f32 {
    let palm_width = hand[INDEX_MCP].distance_2d(hand[PINKY_MCP]);
    finite_or_zero((near - palm_width) / (near - far)).clamp(0.0, 1.0)
}

/// Angle in degrees between two 2D vectors; zero if either is degenerate
#[must_use]
pub fn angle_between(a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    let (la, lb) = (a.norm(), b.norm());
    if !(la > EPSILON && lb > EPSILON) {
        return 0.0;
    }
    let cos = (a.dot(&b) / (la * lb)).clamp(-1.0, 1.0);
    finite_or_zero(cos.acos().to_degrees())
}

/// Evaluate the thumb-and-index heart gesture
#[must_use]
pub fn heart_gesture(hand: &HandLandmarkSet, thresholds: &GestureThresholds) -> HeartReading {
    let tip_distance = hand[THUMB_TIP].distance_2d(hand[INDEX_TIP]);

    let thumb = planar(hand, THUMB_TIP) - planar(hand, THUMB_MCP);
    let index = planar(hand, INDEX_TIP) - planar(hand, INDEX_MCP);
    let angle_deg = angle_between(thumb, index);

    let wrist = hand[WRIST];
    let bent_fingers = CURLED_FINGERTIPS
        .iter()
        .filter(|&&idx| hand[idx].distance_2d(wrist) < thresholds.bent_finger_distance)
        .count();

    let is_heart = tip_distance < thresholds.heart_tip_distance
        && angle_deg > thresholds.heart_min_angle
        && angle_deg < thresholds.heart_max_angle
        && bent_fingers >= thresholds.min_bent_fingers;

    HeartReading {
        tip_distance,
        angle_deg,
        bent_fingers,
        is_heart,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;
    use crate::simulation::poses;
    use proptest::prelude::*;

    #[test]
    fn test_open_hand_is_strong() {
        let strength = openness_strength(&poses::open_hand());
        assert!(strength > 0.95, "open hand strength {strength}");
    }

    #[test]
    fn test_fist_is_weak() {
        let strength = openness_strength(&poses::fist());
        assert!(strength < 0.2, "fist strength {strength}");
    }

    #[test]
    fn test_collapsed_hand() {
        let hand = HandLandmarkSet::new([Landmark::default(); 21]);
        let metrics = analyze(&hand);
        assert_eq!(metrics.openness_raw, 0.0);
        assert_eq!(metrics.rotation, Rotation::ZERO);
        assert!(!metrics.is_facing_camera);
        assert!(!metrics.is_heart_gesture);
        // palm width 0 reads as farther than "far"
        assert_eq!(metrics.distance_raw, 1.0);
    }

    #[test]
    fn test_flat_palm_faces_camera() {
        let orientation = palm_orientation(&poses::flat_palm(), DEFAULT_FACING_THRESHOLD);
        assert!(orientation.is_facing_camera);
        assert_eq!(orientation.rotation, Rotation::ZERO);
        assert!((orientation.normal.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_tilted_palm_angles() {
        let orientation = palm_orientation(&poses::tilted_hand(), DEFAULT_FACING_THRESHOLD);
        assert!(!orientation.is_facing_camera);
        assert!((orientation.normal.norm() - 1.0).abs() < 1e-5);
        assert!(orientation.rotation.yaw > 20.0 && orientation.rotation.yaw < 30.0);
        assert!(orientation.rotation.pitch > 0.0);
    }

    #[test]
    fn test_palm_distance_mapping() {
        let mut points = [Landmark::default(); 21];
        points[INDEX_MCP] = Landmark::new(0.4, 0.5, 0.0);

        points[PINKY_MCP] = Landmark::new(0.65, 0.5, 0.0);
        let near = HandLandmarkSet::new(points);
        assert_eq!(palm_distance(&near, 0.25, 0.08), 0.0);

        points[PINKY_MCP] = Landmark::new(0.45, 0.5, 0.0);
        let far = HandLandmarkSet::new(points);
        assert_eq!(palm_distance(&far, 0.25, 0.08), 1.0);

        points[PINKY_MCP] = Landmark::new(0.565, 0.5, 0.0);
        let mid = HandLandmarkSet::new(points);
        assert!((palm_distance(&mid, 0.25, 0.08) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_heart_fixture() {
        let reading = heart_gesture(&poses::heart_hand(), &GestureThresholds::default());
        assert!((reading.tip_distance - 0.02).abs() < 1e-4);
        assert!((reading.angle_deg - 60.0).abs() < 0.5);
        assert_eq!(reading.bent_fingers, 3);
        assert!(reading.is_heart);
    }

    #[test]
    fn test_heart_requires_every_condition() {
        let thresholds = GestureThresholds::default();
        assert!(!heart_gesture(&poses::heart_tips_apart(), &thresholds).is_heart);
        assert!(!heart_gesture(&poses::heart_parallel_fingers(), &thresholds).is_heart);
        assert!(!heart_gesture(&poses::heart_fingers_extended(), &thresholds).is_heart);
    }

    #[test]
    fn test_angle_between_degenerate() {
        assert_eq!(angle_between(Vector2::zeros(), Vector2::new(1.0, 0.0)), 0.0);
        let right = angle_between(Vector2::new(1.0, 0.0), Vector2::new(0.0, 2.0));
        assert!((right - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(GestureThresholds::default().validate().is_ok());

        let inverted = GestureThresholds {
            palm_width_near: 0.05,
            ..GestureThresholds::default()
        };
        assert!(matches!(inverted.validate(), Err(Error::ConfigError(_))));

        let window = GestureThresholds {
            heart_min_angle: 95.0,
            ..GestureThresholds::default()
        };
        assert!(window.validate().is_err());

        let fingers = GestureThresholds {
            min_bent_fingers: 4,
            ..GestureThresholds::default()
        };
        assert!(fingers.validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_strength_in_unit_range(values in prop::collection::vec(-2.0f32..2.0, 63)) {
            let hand = HandLandmarkSet::from_flat(&values).unwrap();
            let strength = openness_strength(&hand);
            prop_assert!((0.0..=1.0).contains(&strength));
        }

        #[test]
        fn prop_facing_means_zero_angles(values in prop::collection::vec(-1.0f32..1.0, 63)) {
            let hand = HandLandmarkSet::from_flat(&values).unwrap();
            let metrics = analyze(&hand);
            if metrics.is_facing_camera {
                prop_assert_eq!(metrics.rotation, Rotation::ZERO);
            }
            prop_assert!((0.0..=1.0).contains(&metrics.distance_raw));
        }
    }
}
