//! Shared test utilities for the friendsta test suite.
//!
//! Provides synthetic image generators and encoders so tests never depend on
//! fixture files, plus a gateway fixture rooted in a temp directory.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let png = encode_as(&gradient_image(400, 300), ImageFormat::Png);
//! let (_tmp, gateway) = temp_gateway();
//! ```

use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use tempfile::TempDir;

use crate::gallery::store::LocalGateway;

// =========================================================================
// Synthetic images
// =========================================================================

/// Smooth two-axis gradient. Compresses extremely well as JPEG.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        image::Rgb([r, g, 128])
    });
    DynamicImage::ImageRgb8(img)
}

/// Deterministic per-pixel noise (xorshift). Barely compresses at all.
pub fn noise_image(width: u32, height: u32, seed: u32) -> DynamicImage {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    let img = RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xff) as u8
        };
        image::Rgb([next(), next(), next()])
    });
    DynamicImage::ImageRgb8(img)
}

/// Encode an image in the given container format.
pub fn encode_as(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, format).unwrap();
    cursor.into_inner()
}

// =========================================================================
// Gallery fixtures
// =========================================================================

/// A local gateway in a fresh temp directory. Keep the `TempDir` alive for
/// the duration of the test.
pub fn temp_gateway() -> (TempDir, LocalGateway) {
    let tmp = TempDir::new().unwrap();
    let gateway = LocalGateway::open(tmp.path(), "https://cdn.test/photos").unwrap();
    (tmp, gateway)
}
