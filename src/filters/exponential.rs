use crate::{analyzer::Rotation, Error, Result};

/// Check that a smoothing factor lies in `(0, 1]`
///
/// # Errors
///
/// Returns `Error::FilterError` when the factor would never converge (`<= 0`),
/// would overshoot (`> 1`), or is not finite
pub fn validate_factor(factor: f32) -> Result<f32> {
    if factor.is_finite() && factor > 0.0 && factor <= 1.0 {
        Ok(factor)
    } else {
        Err(Error::FilterError(format!(
            "Smoothing factor must be in (0, 1], got {factor}"
        )))
    }
}

/// Exponential smoothing filter
///
/// Each update moves the stable value a fixed fraction of the way toward the
/// raw value: `value += (raw - value) * factor`. The state starts at zero, so
/// the first sample is smoothed as well.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialSmoother {
    factor: f32,
    value: f32,
}

impl ExponentialSmoother {
    /// Create a smoother starting at zero
    ///
    /// # Errors
    ///
    /// Returns `Error::FilterError` if `factor` is outside `(0, 1]`
    pub fn new(factor: f32) -> Result<Self> {
        Ok(Self {
            factor: validate_factor(factor)?,
            value: 0.0,
        })
    }

    /// Step toward `target` with the configured factor
    pub fn update(&mut self, target: f32) -> f32 {
        self.update_with(target, self.factor)
    }

    /// Step toward `target` with a one-off factor
    ///
    /// Out-of-range factors are clamped into `(0, 1]`; a non-finite factor
    /// falls back to the configured one.
    pub fn update_with(&mut self, target: f32, factor: f32) -> f32 {
        let factor = if factor.is_finite() { factor.clamp(f32::EPSILON, 1.0) } else { self.factor };
        self.value += (target - self.value) * factor;
        self.value
    }

    /// Current smoothed value
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Configured smoothing factor
    #[must_use]
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Replace the smoothing factor, keeping the current value
    ///
    /// # Errors
    ///
    /// Returns `Error::FilterError` if `factor` is outside `(0, 1]`
    pub fn set_factor(&mut self, factor: f32) -> Result<()> {
        self.factor = validate_factor(factor)?;
        Ok(())
    }
}

/// Three-channel exponential smoother for Euler angles
///
/// Carries a second, usually faster, factor for frames where the palm faces
/// the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationSmoother {
    pitch: ExponentialSmoother,
    yaw: ExponentialSmoother,
    roll: ExponentialSmoother,
    facing_factor: f32,
}

impl RotationSmoother {
    /// Create a rotation smoother starting at the neutral pose
    ///
    /// # Errors
    ///
    /// Returns `Error::FilterError` if either factor is outside `(0, 1]`
    pub fn new(factor: f32, facing_factor: f32) -> Result<Self> {
        Ok(Self {
            pitch: ExponentialSmoother::new(factor)?,
            yaw: ExponentialSmoother::new(factor)?,
            roll: ExponentialSmoother::new(factor)?,
            facing_factor: validate_factor(facing_factor)?,
        })
    }

    /// Step all three angles toward `target`
    pub fn update(&mut self, target: Rotation, facing: bool) -> Rotation {
        if facing {
            let factor = self.facing_factor;
            Rotation {
                pitch: self.pitch.update_with(target.pitch, factor),
                yaw: self.yaw.update_with(target.yaw, factor),
                roll: self.roll.update_with(target.roll, factor),
            }
        } else {
            Rotation {
                pitch: self.pitch.update(target.pitch),
                yaw: self.yaw.update(target.yaw),
                roll: self.roll.update(target.roll),
            }
        }
    }

    /// Current smoothed rotation
    #[must_use]
    pub fn value(&self) -> Rotation {
        Rotation {
            pitch: self.pitch.value(),
            yaw: self.yaw.value(),
            roll: self.roll.value(),
        }
    }

    /// Factor used while the palm is not facing the camera
    #[must_use]
    pub fn factor(&self) -> f32 {
        self.yaw.factor()
    }

    #[must_use]
    pub fn facing_factor(&self) -> f32 {
        self.facing_factor
    }

    /// Replace both factors, keeping the current angles
    ///
    /// # Errors
    ///
    /// Returns `Error::FilterError` if either factor is outside `(0, 1]`;
    /// nothing changes in that case
    pub fn set_factors(&mut self, factor: f32, facing_factor: f32) -> Result<()> {
        let factor = validate_factor(factor)?;
        self.facing_factor = validate_factor(facing_factor)?;
        for channel in [&mut self.pitch, &mut self.yaw, &mut self.roll] {
            channel.set_factor(factor)?;
        }
        Ok(())
    }
}
