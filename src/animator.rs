//! Particle field animation.
//!
//! Every tick blends each particle a fraction of the way toward its position
//! in the current target shape, scaled and jittered by the stable gesture
//! signal. The same tick eases the field's rotation and the camera distance
//! and derives opacity, point size and colour for the renderer.
//!
//! Holding the heart gesture switches the animator into
//! [`AnimatorMode::HeartOverride`]: the target becomes the glyph cloud with
//! fixed, calm dynamics until the gesture is released.

use crate::{
    config::MotionConfig,
    constants::{HEART_OVERRIDE_LERP, HEART_OVERRIDE_OPACITY, HEART_OVERRIDE_SCALE, HEART_OVERRIDE_SIZE_FACTOR},
    palette::{Palette, PaletteState, Rgb},
    shapes::{ShapeKind, ShapeSet},
    stabilizer::StableGestureSignal,
    utils::{approach, centered_unit, safe_cast::usize_to_f32},
    Error, Result,
};
use nalgebra::Vector3;
use rand::Rng;
use std::f32::consts::TAU;

/// Animator state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimatorMode {
    #[default]
    Normal,
    HeartOverride,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderFrame<'a> {
    /// Flat `[x0, y0, z0, ...]` particle positions
    pub positions: &'a [f32],
    /// Positions were modified since the last frame
    pub changed: bool,
    pub opacity: f32,
    pub point_size: f32,
    pub color: Rgb,
    pub palette_state: PaletteState,
    pub camera_distance: f32,
    /// Field rotation in radians about x, y and z
    pub rotation: Vector3<f32>,
    pub mode: AnimatorMode,
    /// Shape the particles are moving toward
    pub target: ShapeKind,
}

/// Per-tick dynamics derived from the signal
#[derive(Debug, Clone, Copy)]
struct Dynamics {
    scale: f32,
    jitter: f32,
    lerp: f32,
    wave: f32,
    opacity: f32,
    point_size: f32,
}

/// Owns the particle buffer and animates it toward the target shape
pub struct ParticleAnimator<R: Rng> {
    shapes: ShapeSet,
    shape: ShapeKind,
    positions: Vec<f32>,
    motion: MotionConfig,
    palette: Palette,
    particle_size: f32,
    rotation: Vector3<f32>,
    camera_distance: f32,
    mode: AnimatorMode,
    rng: R,
}

impl<R: Rng> ParticleAnimator<R> {
    /// Create an animator whose particles start on `shape`
    ///
    /// # Errors
    ///
    /// Returns `Error::ShapeError` if `shape` is missing from the set and
    /// `Error::InvalidInput` for a non-positive particle size
    pub fn new(
        shapes: ShapeSet,
        shape: ShapeKind,
        motion: &MotionConfig,
        palette: Palette,
        particle_size: f32,
        rng: R,
    ) -> Result<Self> {
        validate_size(particle_size)?;
        let positions = shapes.get(shape)?.to_vec();
        let motion = motion.sanitized();
        let camera_distance = motion.min_distance;

        log::info!(
            "Particle animator ready: {} particles, shape {shape}",
            shapes.particle_count()
        );

        Ok(Self {
            shapes,
            shape,
            positions,
            motion,
            palette,
            particle_size,
            rotation: Vector3::zeros(),
            camera_distance,
            mode: AnimatorMode::Normal,
            rng,
        })
    }

    /// Advance one display frame
    ///
    /// `elapsed` is the time since the animation started, in seconds; it
    /// drives the breathing and wave oscillations.
    pub fn tick(&mut self, signal: &StableGestureSignal, elapsed: f32) -> RenderFrame<'_> {
        self.update_mode(signal.is_heart_gesture);

        let strength = signal.strength.clamp(0.0, 1.0);
        let dynamics = self.dynamics(strength, elapsed);
        let target_kind = self.target_kind();

        if let Ok(target) = self.shapes.get(target_kind) {
            let count = self.positions.len() / 3;
            let n = usize_to_f32(count.max(1));
            let wave_time = elapsed * self.motion.wave_speed;

            for (i, (pos, goal)) in self
                .positions
                .chunks_exact_mut(3)
                .zip(target.chunks_exact(3))
                .enumerate()
            {
                let phase = usize_to_f32(i) / n * TAU;
                let particle_scale = dynamics.scale + (phase + wave_time).sin() * dynamics.wave;
                for axis in 0..3 {
                    let mut aim = goal[axis] * particle_scale;
                    if dynamics.jitter > 0.0 {
                        aim += centered_unit(&mut self.rng) * dynamics.jitter;
                    }
                    pos[axis] = approach(pos[axis], aim, dynamics.lerp);
                }
            }
        } else {
            log::warn!("Target shape {target_kind} missing from shape set");
        }

        self.update_rotation(signal);
        self.update_camera(signal.distance);

        let palette_state = match self.mode {
            AnimatorMode::Normal => PaletteState::Normal,
            AnimatorMode::HeartOverride => PaletteState::HeartOverride,
        };

        RenderFrame {
            positions: &self.positions,
            changed: true,
            opacity: dynamics.opacity,
            point_size: dynamics.point_size,
            color: self.palette.color(palette_state),
            palette_state,
            camera_distance: self.camera_distance,
            rotation: self.rotation,
            mode: self.mode,
            target: target_kind,
        }
    }

    fn update_mode(&mut self, heart: bool) {
        let next = if heart {
            AnimatorMode::HeartOverride
        } else {
            AnimatorMode::Normal
        };
        if next != self.mode {
            match next {
                AnimatorMode::HeartOverride => log::info!("Heart override: forming glyph"),
                AnimatorMode::Normal => log::info!("Heart override released: returning to {}", self.shape),
            }
            self.mode = next;
        }
    }

    fn target_kind(&self) -> ShapeKind {
        match self.mode {
            AnimatorMode::Normal => self.shape,
            AnimatorMode::HeartOverride => ShapeKind::LoveGlyph,
        }
    }

    fn dynamics(&self, strength: f32, elapsed: f32) -> Dynamics {
        match self.mode {
            AnimatorMode::HeartOverride => Dynamics {
                scale: HEART_OVERRIDE_SCALE,
                jitter: 0.0,
                lerp: HEART_OVERRIDE_LERP,
                wave: 0.0,
                opacity: HEART_OVERRIDE_OPACITY,
                point_size: self.particle_size * HEART_OVERRIDE_SIZE_FACTOR,
            },
            AnimatorMode::Normal => {
                let m = &self.motion;
                let breathing = 1.0 + (elapsed * m.breathing_speed * TAU).sin() * m.breathing_intensity;
                Dynamics {
                    scale: (m.min_scale + strength * m.scale_range) * breathing,
                    jitter: strength * m.jitter_gain,
                    lerp: (m.base_lerp + strength * m.lerp_gain).clamp(f32::EPSILON, 1.0 - f32::EPSILON),
                    wave: m.wave_amplitude * strength,
                    opacity: (m.base_opacity + strength * m.opacity_gain + (breathing - 1.0) * 0.5).clamp(0.0, 1.0),
                    point_size: self.particle_size * (1.0 + strength * 0.5) * breathing,
                }
            }
        }
    }

    fn update_rotation(&mut self, signal: &StableGestureSignal) {
        let m = &self.motion;
        let yaw_target = signal.rotation.yaw.to_radians() * m.rotation_sensitivity;
        let yaw_rate = if signal.is_facing_camera {
            m.rotation_rate_facing
        } else {
            m.rotation_rate
        };
        self.rotation.y = approach(self.rotation.y, yaw_target, yaw_rate);
        self.rotation.x = approach(self.rotation.x, 0.0, m.axis_settle_rate);
        self.rotation.z = approach(self.rotation.z, 0.0, m.axis_settle_rate);
    }

    fn update_camera(&mut self, distance: f32) {
        let m = &self.motion;
        let desired = (m.min_distance + distance * m.distance_sensitivity).clamp(m.min_distance, m.max_distance);
        self.camera_distance = approach(self.camera_distance, desired, m.camera_rate);
    }

    /// Current particle positions
    #[must_use]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    #[must_use]
    pub fn mode(&self) -> AnimatorMode {
        self.mode
    }

    /// Configured (non-override) shape
    #[must_use]
    pub fn shape(&self) -> ShapeKind {
        self.shape
    }

    #[must_use]
    pub fn motion(&self) -> &MotionConfig {
        &self.motion
    }

    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[must_use]
    pub fn camera_distance(&self) -> f32 {
        self.camera_distance
    }

    #[must_use]
    pub fn rotation(&self) -> Vector3<f32> {
        self.rotation
    }

    /// Change the target shape; particles flow there over the next ticks
    ///
    /// # Errors
    ///
    /// Returns `Error::ShapeError` if `shape` is missing from the set
    pub fn set_shape(&mut self, shape: ShapeKind) -> Result<()> {
        self.shapes.get(shape)?;
        if shape != self.shape {
            log::info!("Shape changed: {} -> {shape}", self.shape);
            self.shape = shape;
        }
        Ok(())
    }

    /// Replace the motion settings; values are sanitized first
    pub fn set_motion(&mut self, motion: &MotionConfig) {
        self.motion = motion.sanitized();
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// Change the base point size
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `size` is not positive
    pub fn set_particle_size(&mut self, size: f32) -> Result<()> {
        validate_size(size)?;
        self.particle_size = size;
        Ok(())
    }

    /// Swap in a freshly generated shape set
    ///
    /// The particle buffer is reallocated from the configured shape only when
    /// the particle count changes; otherwise particles keep their positions.
    ///
    /// # Errors
    ///
    /// Returns `Error::ShapeError` if the configured shape is missing from
    /// the new set
    pub fn reload_shapes(&mut self, shapes: ShapeSet) -> Result<()> {
        let initial = shapes.get(self.shape)?;
        if shapes.particle_count() != self.particle_count() {
            log::info!(
                "Particle count changed: {} -> {}",
                self.particle_count(),
                shapes.particle_count()
            );
            self.positions = initial.to_vec();
        }
        self.shapes = shapes;
        Ok(())
    }
}

fn validate_size(size: f32) -> Result<()> {
    if size.is_finite() && size > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("Particle size must be positive, got {size}")))
    }
}
