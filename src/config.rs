//! Configuration management for the gesture particle engine

use crate::{
    analyzer::GestureThresholds,
    constants::{
        EPSILON, MAX_BREATHING_INTENSITY, MAX_BREATHING_SPEED, MAX_CAMERA_DISTANCE, MAX_LERP_RATE, MAX_SENSITIVITY,
        MIN_CAMERA_DISTANCE,
    },
    device::{DeviceClass, DeviceProfile, SmoothingFactors},
    palette::{Palette, Rgb, DEFAULT_COLOR, DEFAULT_HEART_COLOR},
    shapes::{glyph::GlyphConfig, ShapeKind},
    utils::clamp_finite,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Particle field appearance
    pub particles: ParticleConfig,

    /// Animation gains and rates
    pub motion: MotionConfig,

    /// Gesture rule thresholds
    pub gesture: GestureThresholds,

    /// Temporal stabilizer overrides
    pub stabilizer: StabilizerConfig,

    /// Device profile override
    pub device: DeviceConfig,

    /// Glyph shape settings
    pub glyph: GlyphConfig,

    /// Frame loop and overlay settings
    pub display: DisplayConfig,
}

/// Particle field configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Particle count; the device profile decides when unset
    pub count: Option<usize>,

    /// Base point size; the device profile decides when unset
    pub size: Option<f32>,

    /// Normal particle colour
    pub color: Rgb,

    /// Colour while the heart gesture is held
    pub heart_color: Rgb,

    /// Target shape outside the heart gesture
    pub shape: ShapeKind,
}

/// Animation gains, rates and camera limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub min_scale: f32,
    pub scale_range: f32,
    pub jitter_gain: f32,
    pub base_lerp: f32,
    pub lerp_gain: f32,
    pub wave_amplitude: f32,
    pub wave_speed: f32,
    /// Breathing cycles per second
    pub breathing_speed: f32,
    pub breathing_intensity: f32,
    pub rotation_sensitivity: f32,
    pub rotation_rate: f32,
    pub rotation_rate_facing: f32,
    /// Rate at which the x and z axes return to zero
    pub axis_settle_rate: f32,
    pub distance_sensitivity: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub camera_rate: f32,
    pub base_opacity: f32,
    pub opacity_gain: f32,
}

/// Stabilizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Consecutive heart frames before the flag turns on
    pub heart_rise_frames: u32,

    /// Consecutive non-heart frames before the flag turns off
    pub heart_fall_frames: u32,

    /// Replaces the device profile's smoothing factors
    pub smoothing: Option<SmoothingFactors>,

    /// Replaces the device profile's detection decimation
    pub decimation: Option<u32>,
}

/// Device configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DeviceConfig {
    /// Skip detection and use this class
    pub class: Option<DeviceClass>,
}

/// Frame loop and overlay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Target display rate of the blocking run loop
    pub target_fps: u32,

    /// Overlay canvas width in pixels
    pub overlay_width: f32,

    /// Overlay canvas height in pixels
    pub overlay_height: f32,

    /// Mirror the overlay horizontally (selfie view)
    pub mirror_overlay: bool,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: None,
            size: None,
            color: DEFAULT_COLOR,
            heart_color: DEFAULT_HEART_COLOR,
            shape: ShapeKind::Heart,
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            min_scale: 1.0,
            scale_range: 3.0,
            jitter_gain: 0.15,
            base_lerp: 0.04,
            lerp_gain: 0.08,
            wave_amplitude: 0.1,
            wave_speed: 1.0,
            breathing_speed: 0.25,
            breathing_intensity: 0.05,
            rotation_sensitivity: 1.0,
            rotation_rate: 0.05,
            rotation_rate_facing: 0.15,
            axis_settle_rate: 0.02,
            distance_sensitivity: 10.0,
            min_distance: 5.0,
            max_distance: 15.0,
            camera_rate: 0.05,
            base_opacity: 0.6,
            opacity_gain: 0.3,
        }
    }
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            heart_rise_frames: 1,
            heart_fall_frames: 1,
            smoothing: None,
            decimation: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            overlay_width: 640.0,
            overlay_height: 480.0,
            mirror_overlay: true,
        }
    }
}

impl MotionConfig {
    /// Copy with every value clamped into its usable range
    ///
    /// Non-finite values fall back to their defaults and an inverted
    /// distance range is reordered.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let gain = |v: f32, fallback: f32| clamp_finite(v, 0.0, MAX_SENSITIVITY, fallback);
        let rate = |v: f32, fallback: f32| clamp_finite(v, EPSILON, MAX_LERP_RATE, fallback);
        let camera = |v: f32, fallback: f32| clamp_finite(v, MIN_CAMERA_DISTANCE, MAX_CAMERA_DISTANCE, fallback);

        let near = camera(self.min_distance, d.min_distance);
        let far = camera(self.max_distance, d.max_distance);

        Self {
            min_scale: gain(self.min_scale, d.min_scale),
            scale_range: gain(self.scale_range, d.scale_range),
            jitter_gain: gain(self.jitter_gain, d.jitter_gain),
            base_lerp: rate(self.base_lerp, d.base_lerp),
            lerp_gain: clamp_finite(self.lerp_gain, 0.0, MAX_LERP_RATE, d.lerp_gain),
            wave_amplitude: gain(self.wave_amplitude, d.wave_amplitude),
            wave_speed: gain(self.wave_speed, d.wave_speed),
            breathing_speed: clamp_finite(self.breathing_speed, 0.0, MAX_BREATHING_SPEED, d.breathing_speed),
            breathing_intensity: clamp_finite(
                self.breathing_intensity,
                0.0,
                MAX_BREATHING_INTENSITY,
                d.breathing_intensity,
            ),
            rotation_sensitivity: gain(self.rotation_sensitivity, d.rotation_sensitivity),
            rotation_rate: rate(self.rotation_rate, d.rotation_rate),
            rotation_rate_facing: rate(self.rotation_rate_facing, d.rotation_rate_facing),
            axis_settle_rate: rate(self.axis_settle_rate, d.axis_settle_rate),
            distance_sensitivity: gain(self.distance_sensitivity, d.distance_sensitivity),
            min_distance: near.min(far),
            max_distance: near.max(far),
            camera_rate: rate(self.camera_rate, d.camera_rate),
            base_opacity: clamp_finite(self.base_opacity, 0.0, 1.0, d.base_opacity),
            opacity_gain: clamp_finite(self.opacity_gain, 0.0, 1.0, d.opacity_gain),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for malformed YAML or field values
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` (or `Error::FilterError` for smoothing
    /// factors) describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.particles.count == Some(0) {
            return Err(Error::ConfigError("Particle count must be greater than 0".to_string()));
        }
        if let Some(size) = self.particles.size {
            if !(size.is_finite() && size > 0.0) {
                return Err(Error::ConfigError(format!("Particle size must be positive, got {size}")));
            }
        }

        self.gesture.validate()?;

        if let Some(smoothing) = &self.stabilizer.smoothing {
            smoothing.validate()?;
        }
        if self.stabilizer.decimation == Some(0) {
            return Err(Error::ConfigError("Decimation must be at least 1".to_string()));
        }

        self.glyph.validate()?;

        if self.display.target_fps == 0 {
            return Err(Error::ConfigError("Target FPS must be greater than 0".to_string()));
        }
        if !(self.display.overlay_width > 0.0 && self.display.overlay_height > 0.0) {
            return Err(Error::ConfigError("Overlay dimensions must be positive".to_string()));
        }

        Ok(())
    }

    /// Device profile with this configuration's overrides applied
    #[must_use]
    pub fn device_profile(&self) -> DeviceProfile {
        self.apply_overrides(DeviceProfile::detect(self.device.class))
    }

    /// Apply particle and stabilizer overrides to an existing profile
    #[must_use]
    pub fn apply_overrides(&self, mut profile: DeviceProfile) -> DeviceProfile {
        if let Some(count) = self.particles.count {
            profile.particle_count = count;
        }
        if let Some(size) = self.particles.size {
            profile.point_size = size;
        }
        if let Some(smoothing) = self.stabilizer.smoothing {
            profile.smoothing = smoothing;
        }
        if let Some(decimation) = self.stabilizer.decimation {
            profile.decimation = decimation;
        }
        profile
    }

    /// Normal and heart colours
    #[must_use]
    pub fn palette(&self) -> Palette {
        Palette {
            normal: self.particles.color,
            heart: self.particles.heart_color,
        }
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r##"# Gesture Particles Configuration

# Particle field
particles:
  # count: 15000        # default: chosen by device class
  # size: 0.05          # default: chosen by device class
  color: "#00ffff"
  heart_color: "#ff3366"
  shape: Heart          # Heart, Sphere, Flower, Knot, Fireworks, LoveGlyph

# Animation gains and rates
motion:
  min_scale: 1.0
  scale_range: 3.0
  jitter_gain: 0.15
  base_lerp: 0.04
  lerp_gain: 0.08
  wave_amplitude: 0.1
  wave_speed: 1.0
  breathing_speed: 0.25
  breathing_intensity: 0.05
  rotation_sensitivity: 1.0
  rotation_rate: 0.05
  rotation_rate_facing: 0.15
  axis_settle_rate: 0.02
  distance_sensitivity: 10.0
  min_distance: 5.0
  max_distance: 15.0
  camera_rate: 0.05
  base_opacity: 0.6
  opacity_gain: 0.3

# Gesture thresholds
gesture:
  facing_threshold: 0.92
  palm_width_near: 0.25
  palm_width_far: 0.08
  heart_tip_distance: 0.05
  heart_min_angle: 30.0
  heart_max_angle: 90.0
  bent_finger_distance: 0.15
  min_bent_fingers: 2

# Temporal stabilizer
stabilizer:
  heart_rise_frames: 1
  heart_fall_frames: 1
  # decimation: 1
  # smoothing:
  #   strength: 0.25
  #   rotation: 0.25
  #   rotation_facing: 0.35
  #   distance: 0.25
  #   no_hand_decay: 0.05

# Device class override; detected when unset
device:
  class: ~  # constrained, mobile, tablet or desktop

# Glyph shape
glyph:
  text: "LOVE"
  # font_path: "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"
  canvas_width: 800
  canvas_height: 300
  font_px: 80.0
  sample_step: 2
  alpha_threshold: 128
  pixels_per_unit: 100.0
  jitter_xy: 0.1
  jitter_z: 0.5
  empty_fallback: heart  # heart or origin

# Frame loop and overlay
display:
  target_fps: 60
  overlay_width: 640.0
  overlay_height: 480.0
  mirror_overlay: true
"##;
