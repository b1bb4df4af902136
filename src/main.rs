//! Headless gesture particle demo driven by synthetic hand landmarks.

use anyhow::{Context, Result};
use clap::Parser;
use gesture_particles::{
    animator::RenderFrame,
    app::{FrameSink, ParticleApp},
    config::{Config, EXAMPLE_CONFIG},
    device::DeviceClass,
    shapes::ShapeKind,
    simulation::{Scenario, SyntheticHandSource},
    stabilizer::StableGestureSignal,
};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Target shape (heart, sphere, flower, knot, fireworks, loveglyph)
    #[arg(short, long)]
    shape: Option<String>,

    /// Particle count, overriding the device profile
    #[arg(short, long)]
    particles: Option<usize>,

    /// Device class (constrained, mobile, tablet, desktop)
    #[arg(long)]
    device: Option<String>,

    /// Number of display frames to render (0 runs forever)
    #[arg(short, long, default_value = "600")]
    frames: u64,

    /// Display frame rate; defaults to the configured target
    #[arg(long)]
    fps: Option<u32>,

    /// Synthetic hand script (cycle, open, fist, heart, idle)
    #[arg(long, default_value = "cycle")]
    scenario: String,

    /// Text formed while the heart gesture is held
    #[arg(short, long)]
    text: Option<String>,

    /// Font file for the glyph text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print an example configuration and exit
    #[arg(long)]
    print_config: bool,
}

/// Logs a one-line summary of every Nth rendered frame
struct LogSink {
    every: u64,
    frames: u64,
}

impl FrameSink for LogSink {
    fn present(&mut self, frame: &RenderFrame<'_>, signal: &StableGestureSignal) -> gesture_particles::Result<()> {
        self.frames += 1;
        if self.frames % self.every == 0 {
            info!(
                "frame {}: {} ({:?}) | strength {}% | opacity {:.2} | size {:.3} | colour {} | camera {:.2} | yaw {:.2} rad",
                self.frames,
                frame.target,
                frame.mode,
                signal.strength_percent(),
                frame.opacity,
                frame.point_size,
                frame.color,
                frame.camera_distance,
                frame.rotation.y
            );
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Gesture Particles");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    // Command line overrides
    if let Some(shape) = &args.shape {
        config.particles.shape = shape.parse::<ShapeKind>()?;
    }
    if let Some(count) = args.particles {
        config.particles.count = Some(count);
    }
    if let Some(device) = &args.device {
        config.device.class = Some(device.parse::<DeviceClass>()?);
    }
    if let Some(text) = args.text {
        config.glyph.text = text;
    }
    if let Some(font) = args.font {
        config.glyph.font_path = Some(font);
    }
    config.validate().context("Invalid configuration")?;

    let scenario: Scenario = args.scenario.parse()?;
    let profile = config.device_profile();
    let fps = args.fps.unwrap_or(config.display.target_fps);

    // Camera frames arrive at half the display rate
    let source = SyntheticHandSource::scenario(scenario)?
        .with_ticks_per_frame(2)
        .with_noise(0.002, 1);
    let sink = LogSink {
        every: u64::from(fps.max(1)),
        frames: 0,
    };

    let mut app = ParticleApp::new(config, profile, source, sink).context("Failed to build particle app")?;
    let max_ticks = (args.frames > 0).then_some(args.frames);
    let ticks = app.run(max_ticks, fps)?;

    let state = app.display_state();
    info!(
        "Done after {} frames: strength {}%, facing {}, heart {}",
        ticks, state.strength_percent, state.facing, state.heart
    );
    Ok(())
}
