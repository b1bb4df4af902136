//! Particle colours.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Default particle colour (cyan)
pub const DEFAULT_COLOR: Rgb = Rgb::new(0x00, 0xff, 0xff);

/// Colour used while the heart gesture is held
pub const DEFAULT_HEART_COLOR: Rgb = Rgb::new(0xff, 0x33, 0x66);

/// 8-bit RGB colour, written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels scaled to `[0, 1]`
    #[must_use]
    pub fn to_unit(self) -> [f32; 3] {
        [self.r, self.g, self.b].map(|c| f32::from(c) / 255.0)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(Error::ConfigError(format!("Invalid colour {s:?}, expected #rrggbb")));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| Error::ConfigError(format!("Invalid colour {s:?}")))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Which colour the renderer should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaletteState {
    #[default]
    Normal,
    HeartOverride,
}

/// Normal and heart-override colours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub normal: Rgb,
    pub heart: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            normal: DEFAULT_COLOR,
            heart: DEFAULT_HEART_COLOR,
        }
    }
}

impl Palette {
    /// Colour for a palette state
    #[must_use]
    pub fn color(&self, state: PaletteState) -> Rgb {
        match state {
            PaletteState::Normal => self.normal,
            PaletteState::HeartOverride => self.heart,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let c: Rgb = "#ff3366".parse().unwrap();
        assert_eq!(c, DEFAULT_HEART_COLOR);
        assert_eq!(c.to_string(), "#ff3366");
        assert_eq!("00FFFF".parse::<Rgb>().unwrap(), DEFAULT_COLOR);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "#fff", "#gg0000", "#12345678", "#ééé"] {
            assert!(bad.parse::<Rgb>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_palette_states() {
        let palette = Palette::default();
        assert_eq!(palette.color(PaletteState::Normal), DEFAULT_COLOR);
        assert_eq!(palette.color(PaletteState::HeartOverride), DEFAULT_HEART_COLOR);
        assert_eq!(DEFAULT_COLOR.to_unit(), [0.0, 1.0, 1.0]);
    }
}
