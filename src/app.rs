//! Application frame loop tying detection, stabilization and animation together.

use crate::{
    analyzer::LandmarkAnalyzer,
    animator::{ParticleAnimator, RenderFrame},
    config::Config,
    constants::STATUS_LOG_INTERVAL_SECS,
    device::DeviceProfile,
    frame_stats::FrameRateMonitor,
    landmarks::{HandLandmarkSet, SkeletonOverlay},
    shapes::ShapeLibrary,
    stabilizer::{FrameOutcome, StableGestureSignal, TemporalStabilizer},
    Error, Result,
};
use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Supplier of video frames and hand landmarks
pub trait LandmarkSource {
    /// Identity of the frame currently available, `None` while the video is
    /// not ready
    fn current_frame(&mut self) -> Option<u64>;

    /// Run hand detection on a frame
    ///
    /// # Errors
    ///
    /// Returns `Error::DetectionError` if detection fails
    fn detect(&mut self, frame: u64) -> Result<Vec<HandLandmarkSet>>;
}

/// Consumer of rendered frames
pub trait FrameSink {
    /// Present one animated frame
    ///
    /// # Errors
    ///
    /// Returns `Error::RenderError` if the frame cannot be shown
    fn present(&mut self, frame: &RenderFrame<'_>, signal: &StableGestureSignal) -> Result<()>;
}

/// Result of one [`ParticleApp::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The app is stopped; nothing ran
    Idle,
    /// A frame was rendered; `frame` says what happened to the video frame,
    /// `None` when the video was not ready
    Rendered { frame: Option<FrameOutcome> },
}

/// Status readout for a HUD
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub strength_percent: u8,
    pub facing: bool,
    pub heart: bool,
    /// Skeleton of the tracked hand in overlay pixels
    pub overlay: Option<SkeletonOverlay>,
}

/// Gesture-driven particle application
pub struct ParticleApp<S: LandmarkSource, K: FrameSink> {
    config: Config,
    profile: DeviceProfile,
    library: ShapeLibrary,
    stabilizer: TemporalStabilizer,
    animator: ParticleAnimator<StdRng>,
    monitor: FrameRateMonitor,
    source: S,
    sink: K,
    rng: StdRng,
    running: bool,
    origin: Option<f64>,
    last_status: Option<f64>,
    ticks: u64,
}

impl<S: LandmarkSource, K: FrameSink> ParticleApp<S, K> {
    /// Create an application with an entropy-seeded generator
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for an invalid configuration and
    /// `Error::ShapeError` / `Error::GlyphError` if the shapes cannot be built
    pub fn new(config: Config, profile: DeviceProfile, source: S, sink: K) -> Result<Self> {
        Self::build(config, profile, source, sink, StdRng::from_entropy())
    }

    /// Create an application with a reproducible generator
    ///
    /// # Errors
    ///
    /// Same as [`ParticleApp::new`]
    pub fn with_seed(config: Config, profile: DeviceProfile, source: S, sink: K, seed: u64) -> Result<Self> {
        Self::build(config, profile, source, sink, StdRng::seed_from_u64(seed))
    }

    fn build(config: Config, profile: DeviceProfile, source: S, sink: K, mut rng: StdRng) -> Result<Self> {
        info!("Initializing gesture particle application");
        config.validate()?;

        let library = ShapeLibrary::new(config.glyph.clone())?;
        let shapes = library.build_set(profile.particle_count, &mut rng)?;

        let stabilizer = TemporalStabilizer::new(
            &profile,
            LandmarkAnalyzer::new(config.gesture.clone()),
            config.stabilizer.heart_rise_frames,
            config.stabilizer.heart_fall_frames,
        )?;

        let animator = ParticleAnimator::new(
            shapes,
            config.particles.shape,
            &config.motion,
            config.palette(),
            profile.point_size,
            StdRng::seed_from_u64(rng.gen()),
        )?;

        info!(
            "Device {}: {} particles, point size {}, antialias {}, pixel ratio cap {}",
            profile.class, profile.particle_count, profile.point_size, profile.antialias, profile.pixel_ratio_cap
        );

        Ok(Self {
            config,
            profile,
            library,
            stabilizer,
            animator,
            monitor: FrameRateMonitor::new(),
            source,
            sink,
            rng,
            running: false,
            origin: None,
            last_status: None,
            ticks: 0,
        })
    }

    /// Start animating; calling it again has no effect
    pub fn start(&mut self) {
        if !self.running {
            info!("Animation started");
            self.running = true;
        }
    }

    /// Stop animating; calling it again has no effect
    pub fn stop(&mut self) {
        if self.running {
            info!("Animation stopped after {} ticks", self.ticks);
            self.running = false;
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one display frame at time `now` (seconds, monotonic)
    ///
    /// # Errors
    ///
    /// Returns the sink's error if presenting the frame fails. Detection
    /// errors are logged and treated as a frame without a hand.
    pub fn tick(&mut self, now: f64) -> Result<TickOutcome> {
        if !self.running {
            return Ok(TickOutcome::Idle);
        }
        self.ticks += 1;
        let origin = *self.origin.get_or_insert(now);

        let frame = self.source.current_frame().map(|frame_id| {
            let source = &mut self.source;
            let outcome = self.stabilizer.process_frame(frame_id, || match source.detect(frame_id) {
                Ok(hands) => hands,
                Err(e) => {
                    warn!("Hand detection failed on frame {frame_id}: {e}");
                    Vec::new()
                }
            });
            if matches!(outcome, FrameOutcome::Updated { .. }) {
                self.monitor.record(now);
            }
            outcome
        });

        #[allow(clippy::cast_possible_truncation)]
        let elapsed = (now - origin).max(0.0) as f32;
        let signal = self.stabilizer.signal();
        let render = self.animator.tick(signal, elapsed);
        self.sink.present(&render, signal)?;

        self.log_status(now);
        Ok(TickOutcome::Rendered { frame })
    }

    fn log_status(&mut self, now: f64) {
        let due = self
            .last_status
            .map_or(true, |last| now - last >= STATUS_LOG_INTERVAL_SECS);
        if !due {
            return;
        }
        self.last_status = Some(now);
        let signal = self.stabilizer.signal();
        debug!(
            "FPS: {:.1} ({}) | device: {} | strength: {}% | facing: {} | distance: {:.2}",
            self.monitor.fps(),
            self.monitor.status(),
            self.profile.class,
            signal.strength_percent(),
            signal.is_facing_camera,
            signal.distance
        );
    }

    /// Blocking loop ticking at `target_fps` until `max_ticks` have run
    ///
    /// Starts the app if needed. `None` runs until the sink fails.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for a zero frame rate and propagates
    /// sink errors
    pub fn run(&mut self, max_ticks: Option<u64>, target_fps: u32) -> Result<u64> {
        if target_fps == 0 {
            return Err(Error::InvalidInput("Target FPS must be greater than 0".to_string()));
        }
        let frame_time = Duration::from_secs_f64(1.0 / f64::from(target_fps));
        let clock = Instant::now();
        let mut ticks = 0;

        self.start();
        info!("Entering frame loop at {target_fps} fps");
        while max_ticks.map_or(true, |max| ticks < max) {
            let frame_start = Instant::now();
            self.tick(clock.elapsed().as_secs_f64())?;
            ticks += 1;

            if let Some(remaining) = frame_time.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
        info!("Frame loop finished after {ticks} ticks");
        Ok(ticks)
    }

    /// Apply a new configuration between ticks
    ///
    /// The device class chosen at startup is kept; count, size and stabilizer
    /// overrides are re-applied on top of it. Shapes are regenerated only if
    /// the particle count or glyph settings change.
    ///
    /// # Errors
    ///
    /// Returns a configuration, shape or glyph error; on error the previous
    /// settings stay in effect for anything not yet applied
    pub fn reconfigure(&mut self, config: Config) -> Result<()> {
        config.validate()?;
        let profile = config.apply_overrides(DeviceProfile::for_class(self.profile.class));

        let glyph_changed = config.glyph != self.config.glyph;
        if glyph_changed {
            self.library = ShapeLibrary::new(config.glyph.clone())?;
        }
        if glyph_changed || profile.particle_count != self.animator.particle_count() {
            let shapes = self.library.build_set(profile.particle_count, &mut self.rng)?;
            self.animator.reload_shapes(shapes)?;
        }

        self.animator.set_shape(config.particles.shape)?;
        self.animator.set_motion(&config.motion);
        self.animator.set_palette(config.palette());
        self.animator.set_particle_size(profile.point_size)?;

        self.stabilizer.set_thresholds(config.gesture.clone())?;
        self.stabilizer.set_factors(profile.smoothing)?;
        if profile.decimation != self.stabilizer.decimation() {
            self.stabilizer.set_decimation(profile.decimation)?;
        }

        info!("Configuration applied");
        self.config = config;
        self.profile = profile;
        Ok(())
    }

    /// HUD values for the current signal
    #[must_use]
    pub fn display_state(&self) -> DisplayState {
        let signal = self.stabilizer.signal();
        let display = &self.config.display;
        DisplayState {
            strength_percent: signal.strength_percent(),
            facing: signal.is_facing_camera,
            heart: signal.is_heart_gesture,
            overlay: signal
                .landmarks
                .as_ref()
                .map(|hand| hand.skeleton_overlay(display.overlay_width, display.overlay_height, display.mirror_overlay)),
        }
    }

    #[must_use]
    pub fn signal(&self) -> &StableGestureSignal {
        self.stabilizer.signal()
    }

    #[must_use]
    pub fn animator(&self) -> &ParticleAnimator<StdRng> {
        &self.animator
    }

    #[must_use]
    pub fn stabilizer(&self) -> &TemporalStabilizer {
        &self.stabilizer
    }

    #[must_use]
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn frame_rate(&self) -> &FrameRateMonitor {
        &self.monitor
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Ticks rendered since creation
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
