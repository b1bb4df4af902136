//! Device classification and quality profiles.
//!
//! A [`DeviceProfile`] is chosen once at startup and bundles every
//! performance-sensitive knob: particle count, point size, renderer hints,
//! detection decimation and the stabilizer's smoothing factors. Smaller
//! devices run detection less often, so they also smooth more aggressively
//! per update.

use crate::{constants::DEFAULT_NO_HAND_DECAY, filters::validate_factor, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse device category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    /// Low-end mobile hardware
    Constrained,
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceClass {
    /// Classify a device from platform hints
    ///
    /// Tablets are recognized first; mobile platforms with fewer than four
    /// logical cores are treated as constrained.
    #[must_use]
    pub fn detect(hints: &DeviceHints) -> Self {
        let platform = hints.platform.to_lowercase();
        let is_tablet = hints.is_tablet || platform.contains("ipad") || platform.contains("tablet");
        let is_mobile = ["android", "iphone", "ipod", "mobile", "ios"]
            .iter()
            .any(|marker| platform.contains(marker));

        if is_tablet {
            Self::Tablet
        } else if is_mobile {
            if hints.logical_cores.is_some_and(|cores| cores < 4) {
                Self::Constrained
            } else {
                Self::Mobile
            }
        } else {
            Self::Desktop
        }
    }

    /// Lowercase name, as used in configuration files
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Constrained => "constrained",
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "constrained" | "low" | "lowend" => Ok(Self::Constrained),
            "mobile" | "phone" => Ok(Self::Mobile),
            "tablet" => Ok(Self::Tablet),
            "desktop" => Ok(Self::Desktop),
            _ => Err(Error::InvalidInput(format!(
                "Unknown device class: {s}. Available: constrained, mobile, tablet, desktop"
            ))),
        }
    }
}

/// Inputs for device classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceHints {
    /// Platform or user-agent string
    pub platform: String,
    pub logical_cores: Option<usize>,
    pub is_tablet: bool,
}

impl DeviceHints {
    /// Hints for the machine this binary runs on
    #[must_use]
    pub fn from_environment() -> Self {
        Self {
            platform: std::env::consts::OS.to_string(),
            logical_cores: std::thread::available_parallelism().ok().map(std::num::NonZeroUsize::get),
            is_tablet: false,
        }
    }
}

/// Per-channel smoothing factors, each in `(0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingFactors {
    pub strength: f32,
    pub rotation: f32,
    /// Rotation factor used while the palm faces the camera
    pub rotation_facing: f32,
    pub distance: f32,
    /// Strength decay factor while no hand is visible
    pub no_hand_decay: f32,
}

impl SmoothingFactors {
    /// Factors for a device class
    #[must_use]
    pub const fn for_class(class: DeviceClass) -> Self {
        match class {
            DeviceClass::Desktop => Self {
                strength: 0.25,
                rotation: 0.25,
                rotation_facing: 0.35,
                distance: 0.25,
                no_hand_decay: DEFAULT_NO_HAND_DECAY,
            },
            DeviceClass::Tablet | DeviceClass::Mobile | DeviceClass::Constrained => Self {
                strength: 0.35,
                rotation: 0.40,
                rotation_facing: 0.50,
                distance: 0.35,
                no_hand_decay: DEFAULT_NO_HAND_DECAY,
            },
        }
    }

    /// Check every factor lies in `(0, 1]`
    ///
    /// # Errors
    ///
    /// Returns `Error::FilterError` naming the first offending channel
    pub fn validate(&self) -> Result<()> {
        for (name, factor) in [
            ("strength", self.strength),
            ("rotation", self.rotation),
            ("rotation_facing", self.rotation_facing),
            ("distance", self.distance),
            ("no_hand_decay", self.no_hand_decay),
        ] {
            validate_factor(factor).map_err(|e| Error::FilterError(format!("{name}: {e}")))?;
        }
        Ok(())
    }
}

/// Quality settings chosen once per session
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    pub class: DeviceClass,
    pub particle_count: usize,
    pub point_size: f32,
    pub antialias: bool,
    pub pixel_ratio_cap: f32,
    /// Run detection on every Nth distinct video frame
    pub decimation: u32,
    pub smoothing: SmoothingFactors,
}

impl DeviceProfile {
    /// Profile for a device class
    #[must_use]
    pub const fn for_class(class: DeviceClass) -> Self {
        let (particle_count, point_size, antialias, pixel_ratio_cap, decimation) = match class {
            DeviceClass::Desktop => (15_000, 0.05, true, 2.0, 1),
            DeviceClass::Tablet => (10_000, 0.06, true, 1.5, 2),
            DeviceClass::Mobile => (8_000, 0.07, false, 1.5, 2),
            DeviceClass::Constrained => (5_000, 0.08, false, 1.0, 3),
        };
        Self {
            class,
            particle_count,
            point_size,
            antialias,
            pixel_ratio_cap,
            decimation,
            smoothing: SmoothingFactors::for_class(class),
        }
    }

    /// Profile for the current machine, or for `override_class` if given
    #[must_use]
    pub fn detect(override_class: Option<DeviceClass>) -> Self {
        let class = override_class.unwrap_or_else(|| DeviceClass::detect(&DeviceHints::from_environment()));
        log::info!("Device class: {class}");
        Self::for_class(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints(platform: &str, cores: Option<usize>) -> DeviceHints {
        DeviceHints {
            platform: platform.to_string(),
            logical_cores: cores,
            is_tablet: false,
        }
    }

    #[test]
    fn test_detect_classes() {
        assert_eq!(DeviceClass::detect(&hints("linux", Some(8))), DeviceClass::Desktop);
        assert_eq!(
            DeviceClass::detect(&hints("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)", Some(6))),
            DeviceClass::Mobile
        );
        assert_eq!(DeviceClass::detect(&hints("Android 9; Mobile", Some(2))), DeviceClass::Constrained);
        assert_eq!(DeviceClass::detect(&hints("Mozilla/5.0 (iPad; CPU OS 17_0)", Some(2))), DeviceClass::Tablet);

        let mut tablet = hints("android", Some(8));
        tablet.is_tablet = true;
        assert_eq!(DeviceClass::detect(&tablet), DeviceClass::Tablet);
    }

    #[test]
    fn test_unknown_cores_is_not_constrained() {
        assert_eq!(DeviceClass::detect(&hints("android", None)), DeviceClass::Mobile);
    }

    #[test]
    fn test_profile_table() {
        let desktop = DeviceProfile::for_class(DeviceClass::Desktop);
        assert_eq!(desktop.particle_count, 15_000);
        assert_eq!(desktop.decimation, 1);
        assert!(desktop.antialias);
        assert_eq!(desktop.smoothing.rotation_facing, 0.35);

        let constrained = DeviceProfile::for_class(DeviceClass::Constrained);
        assert_eq!(constrained.particle_count, 5_000);
        assert_eq!(constrained.decimation, 3);
        assert_eq!(constrained.pixel_ratio_cap, 1.0);
        assert_eq!(constrained.smoothing.rotation, 0.40);
    }

    #[test]
    fn test_class_parse_round_trip() {
        for class in [
            DeviceClass::Constrained,
            DeviceClass::Mobile,
            DeviceClass::Tablet,
            DeviceClass::Desktop,
        ] {
            assert_eq!(class.to_string().parse::<DeviceClass>().unwrap(), class);
        }
        assert!("toaster".parse::<DeviceClass>().is_err());
    }

    #[test]
    fn test_smoothing_validation() {
        assert!(SmoothingFactors::for_class(DeviceClass::Mobile).validate().is_ok());
        let bad = SmoothingFactors {
            distance: 0.0,
            ..SmoothingFactors::for_class(DeviceClass::Desktop)
        };
        match bad.validate() {
            Err(Error::FilterError(msg)) => assert!(msg.contains("distance")),
            other => panic!("Expected FilterError, got {other:?}"),
        }
    }
}
