//! Helper functions and utilities for tests
#![allow(dead_code)]

use gesture_particles::{
    analyzer::LandmarkAnalyzer,
    animator::RenderFrame,
    app::{FrameSink, ParticleApp},
    config::Config,
    device::{DeviceClass, DeviceProfile},
    landmarks::HandLandmarkSet,
    palette::PaletteState,
    simulation::SyntheticHandSource,
    stabilizer::{StableGestureSignal, TemporalStabilizer},
    Error, Result,
};

/// Summary of one presented frame
#[derive(Debug, Clone, PartialEq)]
pub struct PresentedFrame {
    pub opacity: f32,
    pub point_size: f32,
    pub palette_state: PaletteState,
    pub camera_distance: f32,
    pub strength: f32,
}

/// Sink recording every presented frame
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub frames: Vec<PresentedFrame>,
}

impl FrameSink for RecordingSink {
    fn present(&mut self, frame: &RenderFrame<'_>, signal: &StableGestureSignal) -> Result<()> {
        assert_all_finite(frame.positions)?;
        self.frames.push(PresentedFrame {
            opacity: frame.opacity,
            point_size: frame.point_size,
            palette_state: frame.palette_state,
            camera_distance: frame.camera_distance,
            strength: signal.strength,
        });
        Ok(())
    }
}

/// Default configuration with a small particle count
pub fn small_config(particles: usize) -> Config {
    let mut config = Config::default();
    config.particles.count = Some(particles);
    config
}

/// Profile for `class` with the configuration's overrides applied
pub fn profile_for(config: &Config, class: DeviceClass) -> DeviceProfile {
    config.apply_overrides(DeviceProfile::for_class(class))
}

/// Seeded desktop app over a synthetic source
pub fn desktop_app(source: SyntheticHandSource, particles: usize) -> Result<ParticleApp<SyntheticHandSource, RecordingSink>> {
    let config = small_config(particles);
    let profile = profile_for(&config, DeviceClass::Desktop);
    ParticleApp::with_seed(config, profile, source, RecordingSink::default(), 42)
}

/// Stabilizer for a device class with pass-through heart hysteresis
pub fn stabilizer_for(class: DeviceClass) -> Result<TemporalStabilizer> {
    TemporalStabilizer::new(&DeviceProfile::for_class(class), LandmarkAnalyzer::default(), 1, 1)
}

/// Feed the same hand for `frames` updates
pub fn feed(stabilizer: &mut TemporalStabilizer, hand: &HandLandmarkSet, frames: usize) {
    for _ in 0..frames {
        stabilizer.update(std::slice::from_ref(hand));
    }
}

/// Tick a running app at 60 Hz starting from `start`
pub fn tick_for(app: &mut ParticleApp<SyntheticHandSource, RecordingSink>, start: u32, ticks: u32) -> Result<()> {
    for i in start..start + ticks {
        app.tick(f64::from(i) / 60.0)?;
    }
    Ok(())
}

/// Error if any value is NaN or infinite
pub fn assert_all_finite(values: &[f32]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(Error::InvalidInput(format!("Non-finite value at index {i}: {}", values[i]))),
        None => Ok(()),
    }
}
