//! Color-overlay filter configuration.
//!
//! The gallery tints every photo with a translucent color layer blended onto
//! the image. This module only models the settings and their conversion to
//! an overlay color; drawing is the renderer's job.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid color '{0}': expected #rrggbb")]
    InvalidColor(String),
    #[error("Opacity {0} out of range (0-100)")]
    OpacityOutOfRange(u8),
    #[error("Unknown blend mode '{0}'")]
    UnknownBlendMode(String),
}

/// CSS `mix-blend-mode` keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    Normal,
    #[default]
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    pub const ALL: [BlendMode; 16] = [
        Self::Normal,
        Self::Multiply,
        Self::Screen,
        Self::Overlay,
        Self::Darken,
        Self::Lighten,
        Self::ColorDodge,
        Self::ColorBurn,
        Self::HardLight,
        Self::SoftLight,
        Self::Difference,
        Self::Exclusion,
        Self::Hue,
        Self::Saturation,
        Self::Color,
        Self::Luminosity,
    ];

    pub fn as_css(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::ColorDodge => "color-dodge",
            Self::ColorBurn => "color-burn",
            Self::HardLight => "hard-light",
            Self::SoftLight => "soft-light",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Color => "color",
            Self::Luminosity => "luminosity",
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_css())
    }
}

impl FromStr for BlendMode {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_css() == wanted)
            .ok_or_else(|| FilterError::UnknownBlendMode(s.to_string()))
    }
}

/// An overlay color with straight alpha in 0–1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    /// Render as a CSS `rgba()` expression.
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Filter settings shared by every photo in the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSettings {
    /// Overlay color as `#rrggbb`.
    pub color: String,
    /// Overlay opacity in percent.
    pub opacity: u8,
    pub blend_mode: BlendMode,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            color: "#667eea".to_string(),
            opacity: 30,
            blend_mode: BlendMode::Multiply,
        }
    }
}

impl FilterSettings {
    pub fn validate(&self) -> Result<(), FilterError> {
        parse_hex_color(&self.color)?;
        if self.opacity > 100 {
            return Err(FilterError::OpacityOutOfRange(self.opacity));
        }
        Ok(())
    }

    /// The overlay color, alpha = opacity / 100.
    pub fn overlay(&self) -> Result<Rgba, FilterError> {
        self.validate()?;
        let (r, g, b) = parse_hex_color(&self.color)?;
        Ok(Rgba {
            r,
            g,
            b,
            a: self.opacity as f64 / 100.0,
        })
    }
}

/// Parse `#rrggbb` (case-insensitive) into channel bytes.
pub fn parse_hex_color(hex: &str) -> Result<(u8, u8, u8), FilterError> {
    let invalid = || FilterError::InvalidColor(hex.to_string());
    let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_values() {
        let f = FilterSettings::default();
        assert_eq!(f.color, "#667eea");
        assert_eq!(f.opacity, 30);
        assert_eq!(f.blend_mode, BlendMode::Multiply);
    }

    #[test]
    fn default_overlay_css() {
        let overlay = FilterSettings::default().overlay().unwrap();
        assert_eq!(overlay.to_css(), "rgba(102, 126, 234, 0.3)");
    }

    #[test]
    fn parse_hex_upper_and_lower() {
        assert_eq!(parse_hex_color("#FF8000").unwrap(), (255, 128, 0));
        assert_eq!(parse_hex_color("#0a0b0c").unwrap(), (10, 11, 12));
    }

    #[test]
    fn parse_hex_rejects_bad_input() {
        for bad in ["667eea", "#667ee", "#667eeaa", "#zz7eea", "", "#"] {
            assert!(parse_hex_color(bad).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn opacity_above_100_is_rejected() {
        let f = FilterSettings {
            opacity: 101,
            ..FilterSettings::default()
        };
        assert_eq!(f.validate(), Err(FilterError::OpacityOutOfRange(101)));
    }

    #[test]
    fn full_and_zero_opacity() {
        let mut f = FilterSettings::default();
        f.opacity = 100;
        assert_eq!(f.overlay().unwrap().a, 1.0);
        f.opacity = 0;
        assert_eq!(f.overlay().unwrap().a, 0.0);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_string(&FilterSettings::default()).unwrap();
        assert_eq!(
            json,
            r##"{"color":"#667eea","opacity":30,"blendMode":"multiply"}"##
        );
    }

    #[test]
    fn blend_mode_from_str() {
        assert_eq!("soft-light".parse::<BlendMode>(), Ok(BlendMode::SoftLight));
        assert_eq!(" Screen ".parse::<BlendMode>(), Ok(BlendMode::Screen));
        assert_eq!(
            "dissolve".parse::<BlendMode>(),
            Err(FilterError::UnknownBlendMode("dissolve".to_string()))
        );
    }

    #[test]
    fn every_blend_mode_roundtrips_through_css_name() {
        for mode in BlendMode::ALL {
            assert_eq!(mode.as_css().parse::<BlendMode>(), Ok(mode));
        }
    }

    #[test]
    fn blend_mode_kebab_case() {
        let mode: BlendMode = serde_json::from_str("\"color-burn\"").unwrap();
        assert_eq!(mode, BlendMode::ColorBurn);
        assert_eq!(mode.to_string(), "color-burn");
    }
}
