//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the compressor (which decides dimensions and quality
//! per attempt) and the [`backend`](super::backend) (which does the pixel
//! work). Keeping them backend-neutral lets tests drive the compressor with
//! a mock backend.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality factor (0–1). Clamped on construction.
//! - [`OutputFormat`] — Encoded output type, parsed from a MIME string.
//! - [`ResampleFilter`] — The pinned resampling filter.
//! - [`ResampleParams`] — Target dimensions + filter for one resample.
//! - [`EncodeParams`] — Format + quality for one encoding attempt.

use crate::types::Dimensions;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality factor for lossy image encoding (0–1).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Quality(f64);

impl Quality {
    /// Quality reported for blobs that were never re-encoded.
    pub const UNTOUCHED: Quality = Quality(1.0);

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Encoder scale used by the `image` crate codecs (1–100).
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.9)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Encoded output format.
///
/// Only JPEG and AVIF honour the quality factor. The PNG and WebP encoders
/// compiled into the `image` crate are lossless, so every attempt produces the
/// same bytes and the compressor runs straight down to the quality floor when
/// the budget cannot be met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    WebP,
    Avif,
}

impl OutputFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::WebP),
            "image/avif" => Some(Self::Avif),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Avif => "image/avif",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Avif => "avif",
        }
    }

    pub fn honours_quality(self) -> bool {
        matches!(self, Self::Jpeg | Self::Avif)
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_mime(&value).ok_or_else(|| format!("unsupported output MIME type: {value}"))
    }
}

impl From<OutputFormat> for String {
    fn from(format: OutputFormat) -> Self {
        format.mime_type().to_string()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Resampling filter used when downscaling.
///
/// Pinned explicitly so that output is reproducible across backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

/// Parameters for a resample operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleParams {
    pub dimensions: Dimensions,
    pub filter: ResampleFilter,
}

/// Parameters for a single encoding attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeParams {
    pub format: OutputFormat,
    pub quality: Quality,
}
