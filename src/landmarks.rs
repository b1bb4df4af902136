//! Hand landmark storage and skeleton topology.
//!
//! A [`HandLandmarkSet`] is the immutable per-frame input of the analyzer: 21
//! points in normalized image coordinates (`x`, `y` in `[0, 1]`) plus a
//! relative depth `z`. Validation happens once, at construction, so the
//! analyzer can index landmarks without further checks.

use crate::{
    constants::{HAND_LANDMARK_VALUES, NUM_HAND_LANDMARKS},
    Error, Result,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Skeleton connections for overlay drawing (palm loop first, then each finger)
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1),
    (0, 5),
    (0, 17),
    (5, 9),
    (9, 13),
    (13, 17),
    (1, 2),
    (2, 3),
    (3, 4),
    (5, 6),
    (6, 7),
    (7, 8),
    (9, 10),
    (10, 11),
    (11, 12),
    (13, 14),
    (14, 15),
    (15, 16),
    (17, 18),
    (18, 19),
    (19, 20),
];

/// Landmark names, indexed by landmark id
pub const LANDMARK_NAMES: [&str; NUM_HAND_LANDMARKS] = [
    "WRIST",
    "THUMB_CMC",
    "THUMB_MCP",
    "THUMB_IP",
    "THUMB_TIP",
    "INDEX_FINGER_MCP",
    "INDEX_FINGER_PIP",
    "INDEX_FINGER_DIP",
    "INDEX_FINGER_TIP",
    "MIDDLE_FINGER_MCP",
    "MIDDLE_FINGER_PIP",
    "MIDDLE_FINGER_DIP",
    "MIDDLE_FINGER_TIP",
    "RING_FINGER_MCP",
    "RING_FINGER_PIP",
    "RING_FINGER_DIP",
    "RING_FINGER_TIP",
    "PINKY_MCP",
    "PINKY_PIP",
    "PINKY_DIP",
    "PINKY_TIP",
];

/// A single tracked point on the hand
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal image coordinate, normalized to `[0, 1]`
    pub x: f32,
    /// Vertical image coordinate, normalized to `[0, 1]` (down is positive)
    pub y: f32,
    /// Depth relative to the wrist (smaller is closer to the camera)
    pub z: f32,
}

impl Landmark {
    /// Create a landmark from its coordinates
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Position as a 3D vector
    #[must_use]
    pub fn to_vector(self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Euclidean distance in 3D
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self.to_vector() - other.to_vector()).norm()
    }

    /// Euclidean distance in the image plane, ignoring depth
    #[must_use]
    pub fn distance_2d(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<(f32, f32, f32)> for Landmark {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self { x, y, z }
    }
}

/// The 21 landmarks of one detected hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarkSet {
    points: Vec<Landmark>,
}

impl HandLandmarkSet {
    /// Build a landmark set from exactly 21 points
    #[must_use]
    pub fn new(points: [Landmark; NUM_HAND_LANDMARKS]) -> Self {
        Self { points: points.to_vec() }
    }

    /// Build a landmark set from a slice, validating count and finiteness
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLandmarks` if the slice does not hold exactly 21
    /// points or if any coordinate is NaN or infinite
    pub fn from_slice(points: &[Landmark]) -> Result<Self> {
        if points.len() != NUM_HAND_LANDMARKS {
            return Err(Error::InvalidLandmarks(format!(
                "Expected {} landmarks, got {}",
                NUM_HAND_LANDMARKS,
                points.len()
            )));
        }
        if let Some(idx) = points.iter().position(|p| !p.is_finite()) {
            return Err(Error::InvalidLandmarks(format!(
                "Non-finite coordinate at landmark {idx} ({})",
                LANDMARK_NAMES[idx]
            )));
        }
        Ok(Self { points: points.to_vec() })
    }

    /// Build a landmark set from a flat `[x0, y0, z0, x1, ...]` buffer
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLandmarks` if the buffer does not hold 63 values
    /// or carries non-finite values
    pub fn from_flat(values: &[f32]) -> Result<Self> {
        if values.len() != HAND_LANDMARK_VALUES {
            return Err(Error::InvalidLandmarks(format!(
                "Expected {} values, got {}",
                HAND_LANDMARK_VALUES,
                values.len()
            )));
        }
        let points: Vec<Landmark> = values
            .chunks_exact(3)
            .map(|c| Landmark::new(c[0], c[1], c[2]))
            .collect();
        Self::from_slice(&points)
    }

    /// All landmarks in topology order
    #[must_use]
    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    /// Project the hand into a pixel-space overlay
    ///
    /// `mirror` flips the horizontal axis, matching a selfie-style preview.
    #[must_use]
    pub fn skeleton_overlay(&self, width: f32, height: f32, mirror: bool) -> SkeletonOverlay {
        let points: Vec<(f32, f32)> = self
            .points
            .iter()
            .map(|p| {
                let x = if mirror { 1.0 - p.x } else { p.x };
                (x * width, p.y * height)
            })
            .collect();
        let segments = HAND_CONNECTIONS
            .iter()
            .map(|&(a, b)| (points[a], points[b]))
            .collect();
        SkeletonOverlay { points, segments }
    }
}

impl Index<usize> for HandLandmarkSet {
    type Output = Landmark;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

/// Pixel-space skeleton for optional overlay drawing
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonOverlay {
    /// One entry per landmark
    pub points: Vec<(f32, f32)>,
    /// One line segment per skeleton connection
    pub segments: Vec<((f32, f32), (f32, f32))>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_hand() -> Vec<f32> {
        (0..HAND_LANDMARK_VALUES).map(|i| i as f32 * 0.01).collect()
    }

    #[test]
    fn test_from_flat() {
        let hand = HandLandmarkSet::from_flat(&flat_hand()).unwrap();
        assert_eq!(hand.points().len(), NUM_HAND_LANDMARKS);
        assert!((hand[1].x - 0.03).abs() < 1e-6);
        assert!((hand[1].z - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_wrong_count_rejected() {
        let result = HandLandmarkSet::from_slice(&[Landmark::default(); 20]);
        assert!(matches!(result, Err(Error::InvalidLandmarks(_))));

        let result = HandLandmarkSet::from_flat(&[0.0; 62]);
        assert!(matches!(result, Err(Error::InvalidLandmarks(_))));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut values = flat_hand();
        values[14] = f32::NAN;
        match HandLandmarkSet::from_flat(&values) {
            Err(Error::InvalidLandmarks(msg)) => assert!(msg.contains("THUMB_TIP")),
            other => panic!("Expected InvalidLandmarks, got {other:?}"),
        }
    }

    #[test]
    fn test_topology() {
        assert_eq!(HAND_CONNECTIONS.len(), 21);
        // every landmark is reachable from the overlay
        for idx in 0..NUM_HAND_LANDMARKS {
            assert!(HAND_CONNECTIONS.iter().any(|&(a, b)| a == idx || b == idx));
        }
        for &(a, b) in &HAND_CONNECTIONS {
            assert!(a < NUM_HAND_LANDMARKS && b < NUM_HAND_LANDMARKS);
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_skeleton_overlay_mirrors() {
        let mut points = [Landmark::default(); NUM_HAND_LANDMARKS];
        points[0] = Landmark::new(0.25, 0.5, 0.0);
        let hand = HandLandmarkSet::new(points);

        let plain = hand.skeleton_overlay(200.0, 100.0, false);
        assert_eq!(plain.points[0], (50.0, 50.0));
        assert_eq!(plain.segments.len(), HAND_CONNECTIONS.len());

        let mirrored = hand.skeleton_overlay(200.0, 100.0, true);
        assert_eq!(mirrored.points[0], (150.0, 50.0));
    }

    #[test]
    fn test_distances() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(0.3, 0.4, 1.2);
        assert!((a.distance_2d(b) - 0.5).abs() < 1e-6);
        assert!((a.distance(b) - 1.3).abs() < 1e-6);
    }
}
