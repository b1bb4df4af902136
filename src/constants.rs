//! Constants used throughout the engine

/// Number of landmarks in one tracked hand
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Number of floats in a flat landmark buffer (21 points × 3 dimensions)
pub const HAND_LANDMARK_VALUES: usize = 63;

/// Landmark indices (MediaPipe hand topology)
pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_TIP: usize = 20;

/// Fingertips in thumb → pinky order
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Fingertips checked for the "bent" condition of the heart gesture
pub const CURLED_FINGERTIPS: [usize; 3] = [MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Openness normalization ranges (offset, width)
pub const SPREAD_OFFSET: f32 = 0.2;
pub const SPREAD_RANGE: f32 = 0.2;
pub const SPAN_OFFSET: f32 = 0.1;
pub const SPAN_RANGE: f32 = 0.2;
pub const DISPERSION_OFFSET: f32 = 0.05;
pub const DISPERSION_RANGE: f32 = 0.1;

/// Openness score weights
pub const SPREAD_WEIGHT: f32 = 0.5;
pub const SPAN_WEIGHT: f32 = 0.3;
pub const DISPERSION_WEIGHT: f32 = 0.2;

/// Response curve exponent applied to the combined openness
pub const OPENNESS_EXPONENT: f32 = 0.8;

/// Default gesture thresholds
pub const DEFAULT_FACING_THRESHOLD: f32 = 0.92;
pub const DEFAULT_PALM_WIDTH_NEAR: f32 = 0.25;
pub const DEFAULT_PALM_WIDTH_FAR: f32 = 0.08;
pub const DEFAULT_HEART_TIP_DISTANCE: f32 = 0.05;
pub const DEFAULT_HEART_MIN_ANGLE: f32 = 30.0;
pub const DEFAULT_HEART_MAX_ANGLE: f32 = 90.0;
pub const DEFAULT_BENT_FINGER_DISTANCE: f32 = 0.15;
pub const DEFAULT_MIN_BENT_FINGERS: usize = 2;

/// Strength decay factor applied while no hand is visible
pub const DEFAULT_NO_HAND_DECAY: f32 = 0.05;

/// Consecutive empty frames between "no hand" notices
pub const NO_HAND_NOTICE_FRAMES: u64 = 300;

/// Seconds between periodic status logs
pub const STATUS_LOG_INTERVAL_SECS: f64 = 3.0;

/// Frame-rate classification thresholds
pub const FPS_GOOD: f64 = 20.0;
pub const FPS_FAIR: f64 = 15.0;

/// Shape generator constants
pub const SPHERE_RADIUS: f32 = 3.0;
pub const FLOWER_BASE_RADIUS: f32 = 2.0;
pub const FLOWER_PETALS: f32 = 5.0;
pub const KNOT_P: f32 = 3.0;
pub const KNOT_Q: f32 = 7.0;
pub const FIREWORKS_EXTENT: f32 = 12.0;
pub const HEART_XY_SCALE: f32 = 0.22;
pub const HEART_Z_SCALE: f32 = 0.2;
pub const HEART_Y_OFFSET: f32 = 0.8;

/// Glyph raster defaults
pub const DEFAULT_GLYPH_TEXT: &str = "LOVE";
pub const DEFAULT_GLYPH_CANVAS_WIDTH: u32 = 800;
pub const DEFAULT_GLYPH_CANVAS_HEIGHT: u32 = 300;
/// Largest glyph canvas side in pixels
pub const MAX_GLYPH_CANVAS_SIDE: u32 = 4096;
pub const DEFAULT_GLYPH_FONT_PX: f32 = 80.0;
pub const DEFAULT_GLYPH_SAMPLE_STEP: u32 = 2;
pub const DEFAULT_GLYPH_ALPHA_THRESHOLD: u8 = 128;
pub const DEFAULT_GLYPH_PIXELS_PER_UNIT: f32 = 100.0;
pub const DEFAULT_GLYPH_JITTER_XY: f32 = 0.1;
pub const DEFAULT_GLYPH_JITTER_Z: f32 = 0.5;

/// Heart-override dynamics
pub const HEART_OVERRIDE_SCALE: f32 = 1.0;
pub const HEART_OVERRIDE_LERP: f32 = 0.15;
pub const HEART_OVERRIDE_OPACITY: f32 = 1.0;
pub const HEART_OVERRIDE_SIZE_FACTOR: f32 = 1.5;

/// Bounds used when sanitizing motion configuration
pub const MAX_SENSITIVITY: f32 = 50.0;
pub const MIN_CAMERA_DISTANCE: f32 = 0.5;
pub const MAX_CAMERA_DISTANCE: f32 = 100.0;
pub const MAX_BREATHING_SPEED: f32 = 5.0;
pub const MAX_BREATHING_INTENSITY: f32 = 0.5;
pub const MAX_LERP_RATE: f32 = 0.95;

/// Numeric precision epsilon for degenerate geometry
pub const EPSILON: f32 = 1e-6;
