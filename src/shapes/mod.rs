//! Procedural target shapes for the particle field.
//!
//! The [`ShapeLibrary`] turns a [`ShapeKind`] and a particle count into a flat
//! position buffer. A complete [`ShapeSet`] is built once per configuration
//! and never mutated; a particle-count change builds a new one.

/// Text rasterization and glyph sampling
pub mod glyph;

/// Parametric and random point-cloud generators
pub mod primitives;

use crate::{Error, Result};
use glyph::{create_rasterizer, glyph_cloud, sample_pixels, GlyphConfig, GlyphFallback, GlyphRasterizer};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The available target shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShapeKind {
    Heart,
    Sphere,
    Flower,
    Knot,
    Fireworks,
    /// Rasterized text; the target while a heart gesture is held
    #[serde(alias = "LoveText")]
    LoveGlyph,
}

impl ShapeKind {
    /// Every shape, in menu order
    pub const ALL: [Self; 6] = [
        Self::Heart,
        Self::Sphere,
        Self::Flower,
        Self::Knot,
        Self::Fireworks,
        Self::LoveGlyph,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Heart => "Heart",
            Self::Sphere => "Sphere",
            Self::Flower => "Flower",
            Self::Knot => "Knot",
            Self::Fireworks => "Fireworks",
            Self::LoveGlyph => "LoveGlyph",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "heart" => Ok(Self::Heart),
            "sphere" => Ok(Self::Sphere),
            "flower" => Ok(Self::Flower),
            "knot" | "torusknot" => Ok(Self::Knot),
            "fireworks" => Ok(Self::Fireworks),
            "loveglyph" | "lovetext" | "text" => Ok(Self::LoveGlyph),
            _ => Err(Error::ShapeError(format!(
                "Unknown shape: {s}. Available: Heart, Sphere, Flower, Knot, Fireworks, LoveGlyph"
            ))),
        }
    }
}

/// Precomputed position buffers for every shape at one particle count
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSet {
    particle_count: usize,
    shapes: HashMap<ShapeKind, Vec<f32>>,
}

impl ShapeSet {
    /// Positions for `kind`
    ///
    /// # Errors
    ///
    /// Returns `Error::ShapeError` if the set was built without `kind`
    pub fn get(&self, kind: ShapeKind) -> Result<&[f32]> {
        self.shapes
            .get(&kind)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::ShapeError(format!("Shape {kind} missing from set")))
    }

    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.particle_count
    }
}

/// Shape generator holding the pre-sampled glyph raster
pub struct ShapeLibrary {
    glyph: GlyphConfig,
    rasterizer_name: String,
    glyph_samples: Vec<(f32, f32)>,
}

impl ShapeLibrary {
    /// Build a library using the rasterizer selected by `glyph`
    ///
    /// # Errors
    ///
    /// Returns `Error::GlyphError` if the font cannot be loaded or the text
    /// cannot be rasterized, and `Error::ConfigError` for invalid settings
    pub fn new(glyph: GlyphConfig) -> Result<Self> {
        let rasterizer = create_rasterizer(&glyph)?;
        Self::with_rasterizer(glyph, rasterizer.as_ref())
    }

    /// Build a library with an explicit rasterizer
    ///
    /// # Errors
    ///
    /// Returns `Error::GlyphError` if rasterization fails and
    /// `Error::ConfigError` for invalid settings
    pub fn with_rasterizer(glyph: GlyphConfig, rasterizer: &dyn GlyphRasterizer) -> Result<Self> {
        glyph.validate()?;
        let bitmap = rasterizer.rasterize(&glyph.text, &glyph)?;
        let glyph_samples = sample_pixels(&bitmap, &glyph);

        if glyph_samples.is_empty() {
            log::warn!(
                "Glyph text {:?} produced no pixels with {}, falling back to {:?}",
                glyph.text,
                rasterizer.name(),
                glyph.empty_fallback
            );
        } else {
            log::info!(
                "Glyph text {:?} rasterized by {}: {} sample points",
                glyph.text,
                rasterizer.name(),
                glyph_samples.len()
            );
        }

        Ok(Self {
            glyph,
            rasterizer_name: rasterizer.name().to_string(),
            glyph_samples,
        })
    }

    #[must_use]
    pub fn glyph_config(&self) -> &GlyphConfig {
        &self.glyph
    }

    #[must_use]
    pub fn rasterizer_name(&self) -> &str {
        &self.rasterizer_name
    }

    /// Number of covered raster samples the glyph shape draws from
    #[must_use]
    pub fn glyph_sample_count(&self) -> usize {
        self.glyph_samples.len()
    }

    /// Generate `3 × particle_count` positions for one shape
    ///
    /// # Errors
    ///
    /// Returns `Error::ShapeError` if `particle_count` is zero
    pub fn generate<R: Rng + ?Sized>(&self, kind: ShapeKind, particle_count: usize, rng: &mut R) -> Result<Vec<f32>> {
        if particle_count == 0 {
            return Err(Error::ShapeError("Particle count must be at least 1".to_string()));
        }

        let positions = match kind {
            ShapeKind::Heart => primitives::heart(particle_count, rng),
            ShapeKind::Sphere => primitives::sphere(particle_count),
            ShapeKind::Flower => primitives::flower(particle_count, rng),
            ShapeKind::Knot => primitives::knot(particle_count, rng),
            ShapeKind::Fireworks => primitives::fireworks(particle_count, rng),
            ShapeKind::LoveGlyph => match glyph_cloud(&self.glyph_samples, particle_count, &self.glyph, rng) {
                Some(cloud) => cloud,
                None => match self.glyph.empty_fallback {
                    GlyphFallback::Heart => primitives::heart(particle_count, rng),
                    GlyphFallback::Origin => vec![0.0; particle_count * 3],
                },
            },
        };
        Ok(positions)
    }

    /// Generate every shape at one particle count
    ///
    /// # Errors
    ///
    /// Returns `Error::ShapeError` if `particle_count` is zero
    pub fn build_set<R: Rng + ?Sized>(&self, particle_count: usize, rng: &mut R) -> Result<ShapeSet> {
        let mut shapes = HashMap::with_capacity(ShapeKind::ALL.len());
        for kind in ShapeKind::ALL {
            shapes.insert(kind, self.generate(kind, particle_count, rng)?);
        }
        log::debug!("Built shape set for {particle_count} particles");
        Ok(ShapeSet { particle_count, shapes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_every_generator_length_and_finite() {
        let library = ShapeLibrary::new(GlyphConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for kind in ShapeKind::ALL {
            for count in [1, 7, 250] {
                let buf = library.generate(kind, count, &mut rng).unwrap();
                assert_eq!(buf.len(), count * 3, "{kind} at {count}");
                assert!(buf.iter().all(|v| v.is_finite()), "{kind} produced non-finite values");
            }
        }
    }

    #[test]
    fn test_zero_count_rejected() {
        let library = ShapeLibrary::new(GlyphConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            library.generate(ShapeKind::Sphere, 0, &mut rng),
            Err(Error::ShapeError(_))
        ));
        assert!(library.build_set(0, &mut rng).is_err());
    }

    #[test]
    fn test_build_set_contains_all() {
        let library = ShapeLibrary::new(GlyphConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let set = library.build_set(64, &mut rng).unwrap();
        assert_eq!(set.particle_count(), 64);
        for kind in ShapeKind::ALL {
            assert_eq!(set.get(kind).unwrap().len(), 192);
        }
    }

    #[test]
    fn test_empty_glyph_fallbacks() {
        let mut rng = StdRng::seed_from_u64(4);
        let blank = GlyphConfig {
            text: " ".to_string(),
            ..GlyphConfig::default()
        };
        let library = ShapeLibrary::new(blank.clone()).unwrap();
        assert_eq!(library.glyph_sample_count(), 0);
        let buf = library.generate(ShapeKind::LoveGlyph, 50, &mut rng).unwrap();
        assert!(buf.iter().any(|&v| v != 0.0));

        let origin = ShapeLibrary::new(GlyphConfig {
            empty_fallback: GlyphFallback::Origin,
            ..blank
        })
        .unwrap();
        let buf = origin.generate(ShapeKind::LoveGlyph, 50, &mut rng).unwrap();
        assert!(buf.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_shape_names() {
        for kind in ShapeKind::ALL {
            assert_eq!(kind.name().parse::<ShapeKind>().unwrap(), kind);
        }
        assert_eq!("LoveText".parse::<ShapeKind>().unwrap(), ShapeKind::LoveGlyph);
        assert!("cube".parse::<ShapeKind>().is_err());
    }
}
