//! Edge case tests for landmark input, filters, shapes and the frame loop

mod test_helpers;

use gesture_particles::{
    analyzer::LandmarkAnalyzer,
    device::{DeviceClass, DeviceProfile},
    filters::{validate_factor, ExponentialSmoother, HysteresisLatch},
    landmarks::{HandLandmarkSet, Landmark, HAND_CONNECTIONS},
    shapes::{
        glyph::{GlyphConfig, GlyphFallback},
        ShapeKind, ShapeLibrary,
    },
    simulation::{poses, HandPose, Scenario, SyntheticHandSource},
    stabilizer::{FrameGate, TemporalStabilizer},
    Error,
};
use rand::{rngs::StdRng, SeedableRng};
use test_helpers::{assert_all_finite, desktop_app, tick_for};

#[test]
fn test_non_finite_landmarks_rejected() {
    let mut values = vec![0.5_f32; 63];
    for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        values[17] = bad;
        assert!(matches!(HandLandmarkSet::from_flat(&values), Err(Error::InvalidLandmarks(_))));
    }
    assert!(HandLandmarkSet::from_slice(&[Landmark::default(); 22]).is_err());
}

#[test]
fn test_extreme_but_finite_landmarks() {
    let analyzer = LandmarkAnalyzer::default();
    for scale in [1e-20_f32, 1e20] {
        let values: Vec<f32> = (0..63).map(|i| (i % 7) as f32 * scale).collect();
        let hand = HandLandmarkSet::from_flat(&values).unwrap();
        let metrics = analyzer.analyze(&hand);
        assert!((0.0..=1.0).contains(&metrics.openness_raw));
        assert!((0.0..=1.0).contains(&metrics.distance_raw));
        assert!(metrics.rotation.yaw.is_finite());
    }
}

#[test]
fn test_smoothing_factor_bounds() {
    assert!(validate_factor(1.0).is_ok());
    assert!(validate_factor(0.001).is_ok());
    for bad in [0.0, -0.1, 1.01, f32::NAN, f32::INFINITY] {
        assert!(matches!(validate_factor(bad), Err(Error::FilterError(_))), "{bad}");
    }

    let mut smoother = ExponentialSmoother::new(0.5).unwrap();
    assert!(smoother.set_factor(2.0).is_err());
    assert_eq!(smoother.factor(), 0.5);
    // A non-finite one-off factor falls back to the configured one
    assert_eq!(smoother.update_with(1.0, f32::NAN), 0.5);
}

#[test]
fn test_zero_frame_counts() {
    assert!(matches!(FrameGate::new(0), Err(Error::InvalidInput(_))));

    // Zero hysteresis counts behave like one
    let mut latch = HysteresisLatch::new(0, 0);
    assert!(latch.update(true));
    assert!(!latch.update(false));

    let mut profile = DeviceProfile::for_class(DeviceClass::Desktop);
    profile.decimation = 0;
    assert!(TemporalStabilizer::new(&profile, LandmarkAnalyzer::default(), 1, 1).is_err());
}

#[test]
fn test_single_particle_and_blank_glyph() {
    let blank = GlyphConfig {
        text: "   ".to_string(),
        empty_fallback: GlyphFallback::Origin,
        ..GlyphConfig::default()
    };
    let library = ShapeLibrary::new(blank).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let set = library.build_set(1, &mut rng).unwrap();
    assert_eq!(set.get(ShapeKind::LoveGlyph).unwrap(), &[0.0, 0.0, 0.0]);
    for kind in ShapeKind::ALL {
        assert_all_finite(set.get(kind).unwrap()).unwrap();
    }
}

#[test]
fn test_unsupported_glyph_characters() {
    // Characters missing from the block font are skipped, not errors
    let config = GlyphConfig {
        text: "§§".to_string(),
        ..GlyphConfig::default()
    };
    let library = ShapeLibrary::new(config).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let cloud = library.generate(ShapeKind::LoveGlyph, 64, &mut rng).unwrap();
    assert_eq!(cloud.len(), 192);
}

#[test]
fn test_invalid_glyph_settings() {
    let config = GlyphConfig {
        canvas_width: 0,
        ..GlyphConfig::default()
    };
    assert!(matches!(ShapeLibrary::new(config), Err(Error::ConfigError(_))));

    // Oversized canvases are rejected before any bitmap is allocated
    for (width, height) in [(4097, 300), (800, u32::MAX)] {
        let config = GlyphConfig {
            canvas_width: width,
            canvas_height: height,
            ..GlyphConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
        assert!(matches!(ShapeLibrary::new(config), Err(Error::ConfigError(_))));
    }
    let largest = GlyphConfig {
        canvas_width: 4096,
        canvas_height: 4096,
        ..GlyphConfig::default()
    };
    assert!(largest.validate().is_ok());
}

#[test]
fn test_skeleton_overlay_mapping() {
    let hand = poses::open_hand();
    let overlay = hand.skeleton_overlay(640.0, 480.0, false);
    assert_eq!(overlay.points.len(), 21);
    assert_eq!(overlay.segments.len(), HAND_CONNECTIONS.len());
    assert_eq!(overlay.points[0], (320.0, 384.0));

    let mirrored = hand.skeleton_overlay(640.0, 480.0, true);
    assert_eq!(mirrored.points[0], (320.0, 384.0));
    assert!((mirrored.points[4].0 - (640.0 - overlay.points[4].0)).abs() < 1e-3);
}

#[test]
fn test_hand_flicker_keeps_signal_finite() -> gesture_particles::Result<()> {
    let source = SyntheticHandSource::new(vec![
        (HandPose::Heart, 1),
        (HandPose::None, 1),
    ])?
    .with_noise(0.05, 3);
    let mut app = desktop_app(source, 150)?;
    app.start();
    tick_for(&mut app, 0, 200)?;

    let signal = app.signal();
    assert!(signal.strength.is_finite());
    assert!((0.0..=1.0).contains(&signal.strength));
    assert_all_finite(app.animator().positions())?;
    Ok(())
}

#[test]
fn test_long_idle_run() -> gesture_particles::Result<()> {
    let mut app = desktop_app(SyntheticHandSource::scenario(Scenario::Idle)?, 50)?;
    app.start();
    // Crosses the periodic no-hand notice
    tick_for(&mut app, 0, 650)?;
    assert_eq!(app.signal().strength, 0.0);
    assert_eq!(app.sink().frames.len(), 650);
    Ok(())
}
