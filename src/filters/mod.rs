//! Signal filtering primitives for stabilizing gesture metrics.
//!
//! This module provides the smoothing and debouncing building blocks used by
//! the temporal stabilizer to turn noisy per-frame measurements into a stable
//! interaction signal.

/// Exponential smoothing for continuous channels
pub mod exponential;

/// Frame-count hysteresis for discrete flags
pub mod hysteresis;

pub use exponential::{validate_factor, ExponentialSmoother, RotationSmoother};
pub use hysteresis::HysteresisLatch;
