//! Text rasterization for the glyph point cloud.
//!
//! Text is drawn centred on an offscreen alpha bitmap, sampled on a regular
//! pixel grid, and every covered sample becomes a candidate particle
//! position in world units.

use crate::{
    constants::{
        DEFAULT_GLYPH_ALPHA_THRESHOLD, DEFAULT_GLYPH_CANVAS_HEIGHT, DEFAULT_GLYPH_CANVAS_WIDTH, DEFAULT_GLYPH_FONT_PX,
        DEFAULT_GLYPH_JITTER_XY, DEFAULT_GLYPH_JITTER_Z, DEFAULT_GLYPH_PIXELS_PER_UNIT, DEFAULT_GLYPH_SAMPLE_STEP,
        DEFAULT_GLYPH_TEXT, MAX_GLYPH_CANVAS_SIDE,
    },
    utils::{
        centered_unit,
        safe_cast::{f32_to_i32_clamp, f32_to_u8_clamp, u32_to_usize, usize_to_f32},
    },
    Error, Result,
};
use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What the glyph shape becomes when the raster has no covered pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphFallback {
    /// Use the heart shape instead
    #[default]
    Heart,
    /// Collapse every particle to the origin
    Origin,
}

/// Glyph shape settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphConfig {
    pub text: String,
    /// TrueType/OpenType font; the built-in block font is used when unset
    pub font_path: Option<PathBuf>,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub font_px: f32,
    /// Sample every Nth pixel in both directions
    pub sample_step: u32,
    /// Pixels with alpha strictly above this are kept
    pub alpha_threshold: u8,
    pub pixels_per_unit: f32,
    pub jitter_xy: f32,
    pub jitter_z: f32,
    pub empty_fallback: GlyphFallback,
}

impl Default for GlyphConfig {
    fn default() -> Self {
        Self {
            text: DEFAULT_GLYPH_TEXT.to_string(),
            font_path: None,
            canvas_width: DEFAULT_GLYPH_CANVAS_WIDTH,
            canvas_height: DEFAULT_GLYPH_CANVAS_HEIGHT,
            font_px: DEFAULT_GLYPH_FONT_PX,
            sample_step: DEFAULT_GLYPH_SAMPLE_STEP,
            alpha_threshold: DEFAULT_GLYPH_ALPHA_THRESHOLD,
            pixels_per_unit: DEFAULT_GLYPH_PIXELS_PER_UNIT,
            jitter_xy: DEFAULT_GLYPH_JITTER_XY,
            jitter_z: DEFAULT_GLYPH_JITTER_Z,
            empty_fallback: GlyphFallback::Heart,
        }
    }
}

impl GlyphConfig {
    /// Check canvas, font and sampling parameters
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for empty or oversized canvases,
    /// non-positive sizes or a zero sample step
    pub fn validate(&self) -> Result<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(Error::ConfigError("Glyph canvas must not be empty".to_string()));
        }
        if self.canvas_width > MAX_GLYPH_CANVAS_SIDE || self.canvas_height > MAX_GLYPH_CANVAS_SIDE {
            return Err(Error::ConfigError(format!(
                "Glyph canvas {}x{} exceeds {MAX_GLYPH_CANVAS_SIDE} pixels per side",
                self.canvas_width, self.canvas_height
            )));
        }
        if !(self.font_px > 0.0 && self.pixels_per_unit > 0.0) {
            return Err(Error::ConfigError(
                "Glyph font_px and pixels_per_unit must be positive".to_string(),
            ));
        }
        if self.sample_step == 0 {
            return Err(Error::ConfigError("Glyph sample_step must be at least 1".to_string()));
        }
        if !(self.jitter_xy >= 0.0 && self.jitter_z >= 0.0) {
            return Err(Error::ConfigError("Glyph jitter must be non-negative".to_string()));
        }
        Ok(())
    }
}

/// Single-channel coverage bitmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaBitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl AlphaBitmap {
    /// Fully transparent bitmap
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; u32_to_usize(width) * u32_to_usize(height)],
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Alpha at a pixel; 0 outside the bitmap
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[u32_to_usize(y) * u32_to_usize(self.width) + u32_to_usize(x)]
    }

    /// Raise a pixel's alpha to at least `alpha`; out-of-range writes are ignored
    pub fn cover(&mut self, x: i32, y: i32, alpha: u8) {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = u32_to_usize(y) * u32_to_usize(self.width) + u32_to_usize(x);
        self.data[idx] = self.data[idx].max(alpha);
    }

    /// Number of pixels with any coverage
    #[must_use]
    pub fn covered_pixels(&self) -> usize {
        self.data.iter().filter(|&&a| a > 0).count()
    }
}

/// Draws text onto an alpha bitmap
pub trait GlyphRasterizer: Send {
    /// Rasterize `text` centred on a canvas described by `config`
    ///
    /// # Errors
    ///
    /// Returns `Error::GlyphError` if the text cannot be laid out
    fn rasterize(&self, text: &str, config: &GlyphConfig) -> Result<AlphaBitmap>;

    /// Rasterizer name for logging
    fn name(&self) -> &str;
}

/// Pick the rasterizer for a configuration
///
/// # Errors
///
/// Returns `Error::GlyphError` if a configured font cannot be loaded
pub fn create_rasterizer(config: &GlyphConfig) -> Result<Box<dyn GlyphRasterizer>> {
    match &config.font_path {
        Some(path) => Ok(Box::new(FontRasterizer::from_file(path)?)),
        None => Ok(Box::new(BlockFontRasterizer)),
    }
}

/// Outline-font rasterizer backed by `ab_glyph`
pub struct FontRasterizer {
    font: FontVec,
}

impl FontRasterizer {
    /// Load a TrueType/OpenType font file
    ///
    /// # Errors
    ///
    /// Returns `Error::GlyphError` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| Error::GlyphError(format!("Failed to read font {}: {e}", path.display())))?;
        log::info!("Loaded font {}", path.display());
        Self::from_bytes(bytes)
    }

    /// Parse font data already in memory
    ///
    /// # Errors
    ///
    /// Returns `Error::GlyphError` if the data is not a valid font
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = FontVec::try_from_vec(bytes).map_err(|e| Error::GlyphError(format!("Invalid font data: {e}")))?;
        Ok(Self { font })
    }
}

impl GlyphRasterizer for FontRasterizer {
    fn rasterize(&self, text: &str, config: &GlyphConfig) -> Result<AlphaBitmap> {
        let mut bitmap = AlphaBitmap::new(config.canvas_width, config.canvas_height);
        let scale = PxScale::from(config.font_px);
        let scaled = self.font.as_scaled(scale);

        let mut ids = Vec::with_capacity(text.len());
        let mut width = 0.0;
        let mut previous = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            ids.push((id, width));
            width += scaled.h_advance(id);
            previous = Some(id);
        }

        // centre horizontally and vertically around the middle of the em box
        let origin_x = usize_to_f32(u32_to_usize(config.canvas_width)) / 2.0 - width / 2.0;
        let baseline = usize_to_f32(u32_to_usize(config.canvas_height)) / 2.0 + (scaled.ascent() + scaled.descent()) / 2.0;

        for (id, offset) in ids {
            let glyph = id.with_scale_and_position(scale, point(origin_x + offset, baseline));
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            let left = f32_to_i32_clamp(bounds.min.x, i32::MIN, i32::MAX);
            let top = f32_to_i32_clamp(bounds.min.y, i32::MIN, i32::MAX);
            outlined.draw(|gx, gy, coverage| {
                let x = left.saturating_add(i32::try_from(gx).unwrap_or(i32::MAX));
                let y = top.saturating_add(i32::try_from(gy).unwrap_or(i32::MAX));
                bitmap.cover(x, y, f32_to_u8_clamp(coverage * 255.0));
            });
        }

        log::debug!(
            "Rasterized \"{text}\" with outline font: {} covered pixels",
            bitmap.covered_pixels()
        );
        Ok(bitmap)
    }

    fn name(&self) -> &str {
        "FontRasterizer"
    }
}

const BLOCK_COLUMNS: u32 = 5;
const BLOCK_ROWS: u32 = 7;
/// Cells per character including one column of spacing
const BLOCK_ADVANCE: u32 = BLOCK_COLUMNS + 1;

/// Rows of a 5×7 bitmap glyph, top to bottom, bit 4 is the leftmost column
fn block_glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '<' => [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02],
        '♥' => [0x00, 0x0A, 0x1F, 0x1F, 0x0E, 0x04, 0x00],
        ' ' => [0x00; 7],
        _ => return None,
    };
    Some(rows)
}

/// Built-in 5×7 block font, needs no font file
///
/// Covers ASCII letters (case-insensitive), digits, a few punctuation marks
/// and `♥`. Unsupported characters render as blanks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockFontRasterizer;

impl GlyphRasterizer for BlockFontRasterizer {
    fn rasterize(&self, text: &str, config: &GlyphConfig) -> Result<AlphaBitmap> {
        let mut bitmap = AlphaBitmap::new(config.canvas_width, config.canvas_height);
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Ok(bitmap);
        }

        // cap height of roughly 0.7 em
        let cell = (config.font_px * 0.7 / usize_to_f32(u32_to_usize(BLOCK_ROWS))).max(1.0);
        let columns = usize_to_f32(chars.len()) * usize_to_f32(u32_to_usize(BLOCK_ADVANCE)) - 1.0;
        let left = usize_to_f32(u32_to_usize(config.canvas_width)) / 2.0 - columns * cell / 2.0;
        let top = usize_to_f32(u32_to_usize(config.canvas_height)) / 2.0
            - usize_to_f32(u32_to_usize(BLOCK_ROWS)) * cell / 2.0;

        for (slot, &ch) in chars.iter().enumerate() {
            let Some(rows) = block_glyph(ch) else {
                log::debug!("Block font has no glyph for {ch:?}");
                continue;
            };
            let glyph_left = left + usize_to_f32(slot) * usize_to_f32(u32_to_usize(BLOCK_ADVANCE)) * cell;
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..BLOCK_COLUMNS {
                    if bits & (1 << (BLOCK_COLUMNS - 1 - col)) == 0 {
                        continue;
                    }
                    let x0 = glyph_left + usize_to_f32(u32_to_usize(col)) * cell;
                    let y0 = top + usize_to_f32(row) * cell;
                    fill_cell(&mut bitmap, x0, y0, cell);
                }
            }
        }
        Ok(bitmap)
    }

    fn name(&self) -> &str {
        "BlockFontRasterizer"
    }
}

fn to_pixel(v: f32) -> i32 {
    f32_to_i32_clamp(v.round(), i32::MIN, i32::MAX)
}

fn fill_cell(bitmap: &mut AlphaBitmap, x0: f32, y0: f32, size: f32) {
    for y in to_pixel(y0)..to_pixel(y0 + size) {
        for x in to_pixel(x0)..to_pixel(x0 + size) {
            bitmap.cover(x, y, u8::MAX);
        }
    }
}

/// World-space positions of covered raster samples
///
/// Samples every `sample_step` pixels, keeps alpha above the threshold and
/// maps pixel `(x, y)` to `((x - w/2) / ppu, -(y - h/2) / ppu)`.
#[must_use]
pub fn sample_pixels(bitmap: &AlphaBitmap, config: &GlyphConfig) -> Vec<(f32, f32)> {
    let step = u32_to_usize(config.sample_step.max(1));
    let half_w = usize_to_f32(u32_to_usize(bitmap.width())) / 2.0;
    let half_h = usize_to_f32(u32_to_usize(bitmap.height())) / 2.0;

    let mut samples = Vec::new();
    for y in (0..bitmap.height()).step_by(step) {
        for x in (0..bitmap.width()).step_by(step) {
            if bitmap.get(x, y) > config.alpha_threshold {
                samples.push((
                    (usize_to_f32(u32_to_usize(x)) - half_w) / config.pixels_per_unit,
                    -(usize_to_f32(u32_to_usize(y)) - half_h) / config.pixels_per_unit,
                ));
            }
        }
    }
    samples
}

/// Sample `count` jittered particles, with replacement, from raster samples
///
/// Returns `None` when there are no samples to draw from.
pub fn glyph_cloud<R: Rng + ?Sized>(
    samples: &[(f32, f32)],
    count: usize,
    config: &GlyphConfig,
    rng: &mut R,
) -> Option<Vec<f32>> {
    if samples.is_empty() {
        return None;
    }
    let mut out = Vec::with_capacity(count * 3);
    for _ in 0..count {
        let (x, y) = samples[rng.gen_range(0..samples.len())];
        out.extend_from_slice(&[
            x + centered_unit(rng) * config.jitter_xy,
            y + centered_unit(rng) * config.jitter_xy,
            centered_unit(rng) * config.jitter_z,
        ]);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_block_font_covers_centre() {
        let config = GlyphConfig::default();
        let bitmap = BlockFontRasterizer.rasterize("LOVE", &config).unwrap();
        assert_eq!(bitmap.width(), 800);
        assert_eq!(bitmap.height(), 300);
        assert!(bitmap.covered_pixels() > 1000);
        // corners stay empty
        assert_eq!(bitmap.get(0, 0), 0);
        assert_eq!(bitmap.get(799, 299), 0);
    }

    #[test]
    fn test_block_font_blank_text() {
        let config = GlyphConfig::default();
        let bitmap = BlockFontRasterizer.rasterize("   ", &config).unwrap();
        assert_eq!(bitmap.covered_pixels(), 0);
        let bitmap = BlockFontRasterizer.rasterize("", &config).unwrap();
        assert_eq!(bitmap.covered_pixels(), 0);
    }

    #[test]
    fn test_sample_mapping() {
        let config = GlyphConfig {
            canvas_width: 8,
            canvas_height: 4,
            sample_step: 2,
            pixels_per_unit: 2.0,
            ..GlyphConfig::default()
        };
        let mut bitmap = AlphaBitmap::new(8, 4);
        bitmap.cover(6, 0, 200);
        bitmap.cover(2, 2, 128); // at threshold, not kept
        bitmap.cover(3, 3, 255); // off the sampling grid

        let samples = sample_pixels(&bitmap, &config);
        assert_eq!(samples, vec![(1.0, 1.0)]);
    }

    #[test]
    fn test_cover_ignores_out_of_range() {
        let mut bitmap = AlphaBitmap::new(2, 2);
        bitmap.cover(-1, 0, 255);
        bitmap.cover(0, 5, 255);
        assert_eq!(bitmap.covered_pixels(), 0);
        bitmap.cover(1, 1, 10);
        bitmap.cover(1, 1, 5);
        assert_eq!(bitmap.get(1, 1), 10);
    }

    #[test]
    fn test_glyph_cloud_jitter_bounds() {
        let config = GlyphConfig::default();
        let mut rng = StdRng::seed_from_u64(9);
        let cloud = glyph_cloud(&[(1.0, -1.0)], 200, &config, &mut rng).unwrap();
        assert_eq!(cloud.len(), 600);
        for p in cloud.chunks_exact(3) {
            assert!((p[0] - 1.0).abs() <= 0.05);
            assert!((p[1] + 1.0).abs() <= 0.05);
            assert!(p[2].abs() <= 0.25);
        }
        assert!(glyph_cloud(&[], 10, &config, &mut rng).is_none());
    }

    #[test]
    fn test_missing_font_is_glyph_error() {
        let result = FontRasterizer::from_file("/nonexistent/font.ttf");
        assert!(matches!(result, Err(Error::GlyphError(_))));
        assert!(matches!(FontRasterizer::from_bytes(vec![0, 1, 2, 3]), Err(Error::GlyphError(_))));
    }

    #[test]
    fn test_config_validation() {
        assert!(GlyphConfig::default().validate().is_ok());
        let bad = GlyphConfig {
            sample_step: 0,
            ..GlyphConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
