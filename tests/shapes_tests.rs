//! Integration tests for shape generation and glyph rasterization

mod test_helpers;

use gesture_particles::{
    shapes::{
        glyph::{create_rasterizer, sample_pixels, BlockFontRasterizer, FontRasterizer, GlyphConfig, GlyphRasterizer},
        primitives, ShapeKind, ShapeLibrary,
    },
    Error,
};
use rand::{rngs::StdRng, SeedableRng};
use test_helpers::assert_all_finite;

#[test]
fn test_every_shape_every_count() {
    let library = ShapeLibrary::new(GlyphConfig::default()).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    for count in [1, 2, 3, 100, 5000] {
        let set = library.build_set(count, &mut rng).unwrap();
        for kind in ShapeKind::ALL {
            let positions = set.get(kind).unwrap();
            assert_eq!(positions.len(), 3 * count, "{kind} at {count}");
            assert_all_finite(positions).unwrap();
        }
    }
}

#[test]
fn test_sphere_points_lie_on_radius() {
    let points = primitives::sphere(500);
    for p in points.chunks_exact(3) {
        let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
        assert!((r - 3.0).abs() < 1e-3, "radius {r}");
    }
    assert_eq!(primitives::sphere(500), points);
}

#[test]
fn test_seeded_generation_is_reproducible() {
    let library = ShapeLibrary::new(GlyphConfig::default()).unwrap();
    let a = library
        .generate(ShapeKind::Fireworks, 300, &mut StdRng::seed_from_u64(3))
        .unwrap();
    let b = library
        .generate(ShapeKind::Fireworks, 300, &mut StdRng::seed_from_u64(3))
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_glyph_cloud_is_centered_and_flat() {
    let library = ShapeLibrary::new(GlyphConfig::default()).unwrap();
    assert!(library.glyph_sample_count() > 0);
    assert_eq!(library.rasterizer_name(), BlockFontRasterizer.name());

    let mut rng = StdRng::seed_from_u64(5);
    let cloud = library.generate(ShapeKind::LoveGlyph, 2000, &mut rng).unwrap();
    let n = 2000.0;
    let mean_x: f32 = cloud.chunks_exact(3).map(|p| p[0]).sum::<f32>() / n;
    let mean_y: f32 = cloud.chunks_exact(3).map(|p| p[1]).sum::<f32>() / n;
    assert!(mean_x.abs() < 0.5, "mean x {mean_x}");
    assert!(mean_y.abs() < 0.5, "mean y {mean_y}");

    let config = library.glyph_config();
    let half_width = config.canvas_width as f32 / 2.0 / config.pixels_per_unit + config.jitter_xy;
    for p in cloud.chunks_exact(3) {
        assert!(p[0].abs() <= half_width);
        assert!(p[2].abs() <= config.jitter_z);
    }
}

#[test]
fn test_block_font_covers_default_text() {
    let config = GlyphConfig::default();
    let bitmap = BlockFontRasterizer.rasterize(&config.text, &config).unwrap();
    assert_eq!(bitmap.width(), config.canvas_width);
    assert_eq!(bitmap.height(), config.canvas_height);
    assert!(bitmap.covered_pixels() > 0);
    assert!(!sample_pixels(&bitmap, &config).is_empty());
}

fn fixture_font() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSansMono.ttf")
}

#[test]
fn test_outline_font_rasterizes_centered_text() {
    let config = GlyphConfig::default();
    let rasterizer = FontRasterizer::from_file(fixture_font()).unwrap();
    let bitmap = rasterizer.rasterize(&config.text, &config).unwrap();
    assert_eq!(bitmap.width(), config.canvas_width);
    assert_eq!(bitmap.height(), config.canvas_height);
    assert!(bitmap.covered_pixels() > 0);

    let samples = sample_pixels(&bitmap, &config);
    assert!(!samples.is_empty());
    let n = samples.len() as f32;
    let mean_x = samples.iter().map(|s| s.0).sum::<f32>() / n;
    let mean_y = samples.iter().map(|s| s.1).sum::<f32>() / n;
    assert!(mean_x.abs() < 0.5, "mean x {mean_x}");
    assert!(mean_y.abs() < 0.5, "mean y {mean_y}");

    // Whitespace has no outline
    let blank = rasterizer.rasterize("   ", &config).unwrap();
    assert_eq!(blank.covered_pixels(), 0);
}

#[test]
fn test_library_uses_configured_font() {
    let bytes = std::fs::read(fixture_font()).unwrap();
    assert!(FontRasterizer::from_bytes(bytes).is_ok());

    let config = GlyphConfig {
        font_path: Some(fixture_font()),
        ..GlyphConfig::default()
    };
    let library = ShapeLibrary::new(config).unwrap();
    assert_eq!(library.rasterizer_name(), "FontRasterizer");
    assert!(library.glyph_sample_count() > 0);

    let mut rng = StdRng::seed_from_u64(9);
    let cloud = library.generate(ShapeKind::LoveGlyph, 500, &mut rng).unwrap();
    assert_eq!(cloud.len(), 1500);
    assert_all_finite(&cloud).unwrap();
    assert!(cloud.chunks_exact(3).any(|p| p[0] != 0.0 || p[1] != 0.0));
}

#[test]
fn test_missing_font_is_glyph_error() {
    let config = GlyphConfig {
        font_path: Some("/nonexistent/font.ttf".into()),
        ..GlyphConfig::default()
    };
    assert!(matches!(create_rasterizer(&config), Err(Error::GlyphError(_))));
    assert!(matches!(ShapeLibrary::new(config), Err(Error::GlyphError(_))));
    assert!(matches!(
        FontRasterizer::from_bytes(b"not a font".to_vec()),
        Err(Error::GlyphError(_))
    ));
}

#[test]
fn test_shape_kind_serde_names() {
    let yaml = serde_yaml::to_string(&ShapeKind::LoveGlyph).unwrap();
    assert_eq!(yaml.trim(), "LoveGlyph");
    let parsed: ShapeKind = serde_yaml::from_str("LoveText").unwrap();
    assert_eq!(parsed, ShapeKind::LoveGlyph);
}
