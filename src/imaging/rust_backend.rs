//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::with_guessed_format` + `into_dimensions` (header only) |
//! | Identify (AVIF) | `avif-parse` container metadata |
//! | Decode (JPEG, PNG, GIF, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Resample | `DynamicImage::resize_exact` with the pinned filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality 1–100) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Encode → PNG / WebP | lossless `PngEncoder` / `WebPEncoder` |
//!
//! Formats are sniffed from the payload's magic bytes. The MIME type a blob
//! declares is never trusted for decoding.
//!
//! AVIF is write-only for pixels: its dimensions can be read, so an AVIF
//! already within budget passes through untouched, but it cannot be decoded
//! for re-encoding.

use super::backend::{BackendError, ImageBackend};
use super::params::{EncodeParams, OutputFormat, ResampleFilter, ResampleParams};
use crate::types::{Dimensions, ImageBlob};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders may be compiled in.
///
/// AVIF is excluded: the `image` crate's `"avif"` feature only enables the
/// **encoder** (rav1e), yet `ImageFormat::reading_enabled()` reports `true`
/// for it, so that API alone cannot be trusted here.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Guess a MIME type from a file extension. Unknown extensions yield
/// `application/octet-stream`; decoding sniffs the real format anyway.
pub fn mime_for_path(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .map(|fmt| fmt.to_mime_type())
        .unwrap_or("application/octet-stream")
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn reader(blob: &ImageBlob) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(blob.bytes()))
        .with_guessed_format()
        .map_err(BackendError::Io)
}

/// ISO-BMFF `ftyp` box carrying an AVIF brand.
fn is_avif(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[4..8] == b"ftyp" && matches!(&bytes[8..12], b"avif" | b"avis")
}

/// Extract dimensions from an AVIF payload's container metadata (no AV1 decode).
fn identify_avif(blob: &ImageBlob) -> Result<Dimensions, BackendError> {
    let avif = avif_parse::read_avif(&mut Cursor::new(blob.bytes())).map_err(|e| {
        BackendError::Decode(format!("Failed to parse AVIF {}: {e:?}", describe(blob)))
    })?;
    let meta = avif.primary_item_metadata().map_err(|e| {
        BackendError::Decode(format!(
            "Failed to read AVIF metadata {}: {e:?}",
            describe(blob)
        ))
    })?;
    Ok(Dimensions {
        width: meta.max_frame_width.get(),
        height: meta.max_frame_height.get(),
    })
}

fn describe(blob: &ImageBlob) -> &str {
    blob.name().unwrap_or("<unnamed>")
}

fn filter_type(filter: ResampleFilter) -> FilterType {
    match filter {
        ResampleFilter::Nearest => FilterType::Nearest,
        ResampleFilter::Triangle => FilterType::Triangle,
        ResampleFilter::CatmullRom => FilterType::CatmullRom,
        ResampleFilter::Gaussian => FilterType::Gaussian,
        ResampleFilter::Lanczos3 => FilterType::Lanczos3,
    }
}

fn encode_error(format: OutputFormat, err: image::ImageError) -> BackendError {
    BackendError::Encode(format!("{format} encode failed: {err}"))
}

impl ImageBackend for RustBackend {
    type Surface = DynamicImage;

    fn identify(&self, blob: &ImageBlob) -> Result<Dimensions, BackendError> {
        if is_avif(blob.bytes()) {
            return identify_avif(blob);
        }
        let (width, height) = reader(blob)?.into_dimensions().map_err(|e| {
            BackendError::Decode(format!(
                "Failed to read dimensions of {}: {}",
                describe(blob),
                e
            ))
        })?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, blob: &ImageBlob) -> Result<DynamicImage, BackendError> {
        reader(blob)?.decode().map_err(|e| {
            BackendError::Decode(format!("Failed to decode {}: {}", describe(blob), e))
        })
    }

    fn resample(&self, surface: DynamicImage, params: &ResampleParams) -> DynamicImage {
        let Dimensions { width, height } = params.dimensions;
        if surface.width() == width && surface.height() == height {
            return surface;
        }
        surface.resize_exact(width, height, filter_type(params.filter))
    }

    fn encode(
        &self,
        surface: &DynamicImage,
        params: &EncodeParams,
    ) -> Result<Vec<u8>, BackendError> {
        let mut buf = Vec::new();
        let (width, height) = (surface.width(), surface.height());

        match params.format {
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = surface.to_rgb8();
                JpegEncoder::new_with_quality(&mut buf, params.quality.percent())
                    .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                    .map_err(|e| encode_error(params.format, e))?;
            }
            OutputFormat::Avif => {
                let rgba = surface.to_rgba8();
                AvifEncoder::new_with_speed_quality(&mut buf, 6, params.quality.percent())
                    .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
                    .map_err(|e| encode_error(params.format, e))?;
            }
            OutputFormat::Png => {
                surface
                    .write_with_encoder(PngEncoder::new(&mut buf))
                    .map_err(|e| encode_error(params.format, e))?;
            }
            OutputFormat::WebP => {
                let rgba = surface.to_rgba8();
                WebPEncoder::new_lossless(&mut buf)
                    .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
                    .map_err(|e| encode_error(params.format, e))?;
            }
        }

        Ok(buf)
    }
}
