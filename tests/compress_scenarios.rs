//! End-to-end compression scenarios against the real `image` backend.
//!
//! Inputs are synthesized in memory: smooth gradients compress well, xorshift
//! noise barely compresses at all. Large inputs are encoded as uncompressed
//! TIFF so their byte size is predictable (3 bytes per pixel).

use friendsta::compress::{CompressError, CompressionTarget, compress, compress_batch};
use friendsta::imaging::calculations::aspect_preserved;
use friendsta::imaging::{OutputFormat, RustBackend};
use friendsta::types::ImageBlob;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 96])
    }))
}

fn noise(width: u32, height: u32) -> DynamicImage {
    let mut state: u32 = 0x9e37_79b9;
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xff) as u8
        };
        image::Rgb([next(), next(), next()])
    }))
}

fn blob(img: &DynamicImage, format: ImageFormat, name: &str) -> ImageBlob {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, format).unwrap();
    ImageBlob::new(cursor.into_inner(), format.to_mime_type()).with_name(name)
}

fn target(max_bytes: u64, max_dimension: u32) -> CompressionTarget {
    CompressionTarget {
        max_bytes,
        max_dimension,
        ..CompressionTarget::default()
    }
}

#[test]
fn large_landscape_is_scaled_and_fits_budget() {
    let input = blob(&gradient(3000, 1500), ImageFormat::Tiff, "wide.tif");
    assert!(input.byte_len() > 10_000_000);

    let result = compress(input, &target(500_000, 2048)).unwrap();

    assert_eq!(result.dimensions.width, 2048);
    assert_eq!(result.dimensions.height, 1024);
    assert_eq!(result.original_dimensions.width, 3000);
    assert!(result.met_budget);
    assert!(result.blob.byte_len() <= 500_000);
    assert_eq!(result.blob.mime_type(), "image/jpeg");
    assert_eq!(result.blob.name(), Some("wide.tif"));

    let drift = (result.dimensions.aspect_ratio() - 2.0).abs();
    assert!(drift <= 1.0 / 1024.0);
    assert!(aspect_preserved(result.original_dimensions, result.dimensions));

    let decoded = image::load_from_memory(result.blob.bytes()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (2048, 1024));
}

#[test]
fn compliant_output_compresses_to_itself() {
    let t = target(200_000, 640);
    let first = compress(blob(&gradient(1600, 900), ImageFormat::Tiff, "a.tif"), &t).unwrap();
    assert!(first.met_budget);

    let second = compress(first.blob.clone(), &t).unwrap();

    assert_eq!(second.attempts, 0);
    assert_eq!(second.blob, first.blob);
    assert_eq!(second.dimensions, first.dimensions);
}

#[test]
fn compliant_avif_output_compresses_to_itself() {
    let t = CompressionTarget {
        output_mime_type: OutputFormat::Avif,
        ..target(60_000, 160)
    };
    let first = compress(blob(&gradient(640, 480), ImageFormat::Tiff, "a.tif"), &t).unwrap();
    assert!(first.met_budget);
    assert_eq!(first.blob.mime_type(), "image/avif");

    let second = compress(first.blob.clone(), &t).unwrap();

    assert_eq!(second.attempts, 0);
    assert_eq!(second.blob, first.blob);
    assert_eq!(second.dimensions, first.dimensions);
}

#[test]
fn small_input_is_returned_untouched() {
    let input = blob(&gradient(400, 400), ImageFormat::Jpeg, "small.jpg");
    assert!(input.byte_len() <= 100_000);

    let result = compress(input.clone(), &target(100_000, 2048)).unwrap();

    assert_eq!(result.blob, input);
    assert_eq!(result.quality.value(), 1.0);
    assert_eq!(result.attempts, 0);
    assert!(result.met_budget);
    assert_eq!(result.dimensions.width, 400);
}

#[test]
fn small_input_keeps_dimensions_above_max() {
    let input = blob(&gradient(900, 300), ImageFormat::Jpeg, "banner.jpg");

    let result = compress(input.clone(), &target(1_000_000, 256)).unwrap();

    assert_eq!(result.blob, input);
    assert_eq!(result.dimensions.width, 900);
}

#[test]
fn incompressible_input_stops_at_floor() {
    let input = blob(&noise(512, 512), ImageFormat::Tiff, "noise.tif");
    let t = target(1_000, 2048);

    let result = compress(input, &t).unwrap();

    assert!(!result.met_budget);
    assert_eq!(result.quality.value(), t.min_quality);
    assert_eq!(result.attempts, t.max_attempts());
    assert!(result.blob.byte_len() > 1_000);
    assert_eq!(result.dimensions.width, 512);
}

#[test]
fn portrait_is_bounded_on_height() {
    let input = blob(&gradient(1200, 2400), ImageFormat::Tiff, "tall.tif");

    let result = compress(input, &target(300_000, 800)).unwrap();

    assert_eq!(result.dimensions.width, 400);
    assert_eq!(result.dimensions.height, 800);
    assert!(aspect_preserved(result.original_dimensions, result.dimensions));
}

#[test]
fn corrupt_input_is_decode_error() {
    let garbage = ImageBlob::new(vec![0x42; 64 * 1024], "image/jpeg").with_name("bad.jpg");

    let result = compress(garbage, &target(1_000, 2048));

    assert!(matches!(result, Err(CompressError::Decode(_))));
}

#[test]
fn declared_mime_type_is_not_trusted() {
    let mut cursor = Cursor::new(Vec::new());
    gradient(800, 600)
        .write_to(&mut cursor, ImageFormat::Tiff)
        .unwrap();
    let mislabeled = ImageBlob::new(cursor.into_inner(), "image/png");

    let result = compress(mislabeled, &target(100_000, 400)).unwrap();

    assert_eq!(result.dimensions.width, 400);
    assert!(result.met_budget);
}

#[test]
fn invalid_target_is_rejected_before_decoding() {
    let input = ImageBlob::new(vec![0; 10], "image/jpeg");
    let t = CompressionTarget {
        min_quality: 0.0,
        ..CompressionTarget::default()
    };
    assert!(matches!(
        compress(input, &t),
        Err(CompressError::InvalidTarget(_))
    ));
}

#[test]
fn lossless_png_output() {
    let input = blob(&gradient(512, 512), ImageFormat::Tiff, "g.tif");
    let t = CompressionTarget {
        output_mime_type: OutputFormat::Png,
        ..target(150_000, 128)
    };

    let result = compress(input, &t).unwrap();

    assert_eq!(result.blob.mime_type(), "image/png");
    assert_eq!(result.attempts, 1);
    let decoded = image::load_from_memory(result.blob.bytes()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (128, 128));
}

#[test]
fn lossless_webp_output() {
    let input = blob(&gradient(512, 256), ImageFormat::Tiff, "g.tif");
    let t = CompressionTarget {
        output_mime_type: OutputFormat::WebP,
        ..target(100_000, 128)
    };

    let result = compress(input, &t).unwrap();

    assert_eq!(result.blob.mime_type(), "image/webp");
    let decoded = image::load_from_memory(result.blob.bytes()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (128, 64));
}

#[test]
fn batch_isolates_failures_and_keeps_order() {
    let inputs = vec![
        blob(&gradient(800, 400), ImageFormat::Tiff, "one.tif"),
        ImageBlob::new(vec![0x13; 50_000], "image/jpeg").with_name("broken.jpg"),
        blob(&gradient(300, 300), ImageFormat::Jpeg, "three.jpg"),
    ];

    let results = compress_batch(&RustBackend::new(), inputs, &target(40_000, 256));

    assert_eq!(results.len(), 3);
    let first = results[0].as_ref().unwrap();
    assert_eq!(first.blob.name(), Some("one.tif"));
    assert_eq!(first.dimensions.width, 256);
    assert!(matches!(results[1], Err(CompressError::Decode(_))));
    assert_eq!(results[2].as_ref().unwrap().blob.name(), Some("three.jpg"));
}
