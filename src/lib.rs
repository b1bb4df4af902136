//! Gesture-driven particle field engine.
//!
//! Hand landmarks from an external tracker are turned into a smoothed
//! interaction signal, which in turn drives a field of particles morphing
//! between procedural shapes:
//! 1. [`analyzer`] derives openness, palm orientation, distance and the heart
//!    gesture from the 21 landmarks of one hand
//! 2. [`stabilizer`] gates frames and smooths those metrics over time
//! 3. [`animator`] eases every particle toward the active [`shapes`] target
//! 4. [`app`] runs the frame loop between a landmark source and a renderer
//!
//! # Examples
//!
//! ## Analyzing one hand
//!
//! ```
//! use gesture_particles::analyzer::LandmarkAnalyzer;
//! use gesture_particles::simulation::poses;
//!
//! let analyzer = LandmarkAnalyzer::default();
//! let metrics = analyzer.analyze(&poses::open_hand());
//! assert!(metrics.openness_raw > 0.8);
//! assert!(metrics.is_facing_camera);
//! ```
//!
//! ## Running the pipeline headless
//!
//! ```
//! use gesture_particles::{
//!     animator::RenderFrame,
//!     app::{FrameSink, ParticleApp},
//!     config::Config,
//!     device::{DeviceClass, DeviceProfile},
//!     simulation::{Scenario, SyntheticHandSource},
//!     stabilizer::StableGestureSignal,
//! };
//!
//! struct NullSink;
//!
//! impl FrameSink for NullSink {
//!     fn present(&mut self, _frame: &RenderFrame<'_>, _signal: &StableGestureSignal) -> gesture_particles::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> gesture_particles::Result<()> {
//! let mut config = Config::default();
//! config.particles.count = Some(500);
//! let profile = config.apply_overrides(DeviceProfile::for_class(DeviceClass::Desktop));
//! let source = SyntheticHandSource::scenario(Scenario::Open)?;
//!
//! let mut app = ParticleApp::with_seed(config, profile, source, NullSink, 42)?;
//! app.start();
//! for i in 0..30 {
//!     app.tick(f64::from(i) / 60.0)?;
//! }
//! assert!(app.signal().strength > 0.8);
//! # Ok(())
//! # }
//! ```

/// Landmark geometry: openness, orientation, distance and heart detection
pub mod analyzer;

/// Particle buffer animation and render parameters
pub mod animator;

/// Frame loop, landmark source and frame sink interfaces
pub mod app;

/// Configuration management
pub mod config;

/// Constants used throughout the engine
pub mod constants;

/// Device classification and quality profiles
pub mod device;

/// Error types and result handling
pub mod error;

/// Smoothing filters used by the stabilizer
pub mod filters;

/// Detection frame-rate monitoring
pub mod frame_stats;

/// Hand landmark types and skeleton topology
pub mod landmarks;

/// Particle colours
pub mod palette;

/// Procedural target shapes
pub mod shapes;

/// Synthetic hand poses and a scripted landmark source
pub mod simulation;

/// Temporal smoothing of gesture metrics
pub mod stabilizer;

/// Numeric helpers and safe casts
pub mod utils;

pub use error::{Error, Result};
