//! Small numeric helpers shared by the animator and shape generators.

pub mod safe_cast;

use rand::Rng;

/// Move `current` toward `target` by `rate` of the remaining gap
#[must_use]
pub fn approach(current: f32, target: f32, rate: f32) -> f32 {
    current + (target - current) * rate
}

/// Uniform sample in `[-0.5, 0.5)`
pub fn centered_unit<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>() - 0.5
}

/// Clamp a value into `[min, max]`, replacing non-finite input with `fallback`
#[must_use]
pub fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback.clamp(min, max)
    }
}
