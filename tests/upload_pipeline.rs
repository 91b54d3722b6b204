//! Upload pipeline against a real data directory and the real backend.

use friendsta::compress::CompressionTarget;
use friendsta::gallery::auth::token_digest;
use friendsta::gallery::upload::{self, UploadError, UploadEvent};
use friendsta::gallery::{
    AuthError, BlendMode, FilterSettings, LocalGateway, PhotoDetails, PhotoGateway, TokenGate,
};
use friendsta::imaging::{OutputFormat, RustBackend};
use friendsta::scan;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tempfile::TempDir;

const TOKEN: &str = "correct horse battery staple";

fn write_gradient(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 255 / width) as u8, 64, (y * 255 / height) as u8])
    }));
    let path = dir.join(name);
    img.save_with_format(&path, ImageFormat::from_path(&path).unwrap())
        .unwrap();
    path
}

fn target() -> CompressionTarget {
    CompressionTarget {
        max_bytes: 100_000,
        max_dimension: 300,
        ..CompressionTarget::default()
    }
}

struct Fixture {
    _tmp: TempDir,
    inputs: PathBuf,
    gateway: LocalGateway,
    gate: TokenGate,
}

fn fixture() -> Fixture {
    let tmp = TempDir::new().unwrap();
    let inputs = tmp.path().join("inputs");
    fs::create_dir_all(&inputs).unwrap();
    let gateway =
        LocalGateway::open(&tmp.path().join("data"), "https://photos.example.org/o").unwrap();
    let digest = token_digest(TOKEN);
    let gate = TokenGate::new(Some(digest.as_str()), Some(TOKEN));
    Fixture {
        _tmp: tmp,
        inputs,
        gateway,
        gate,
    }
}

#[test]
fn uploads_directory_and_lists_newest_first() {
    let fx = fixture();
    write_gradient(&fx.inputs, "a-landscape.tif", 600, 400);
    write_gradient(&fx.inputs, "b-portrait.tif", 200, 500);
    fs::write(fx.inputs.join("readme.txt"), "not an image").unwrap();
    fs::write(fx.inputs.join("c-broken.jpg"), vec![0x55; 150_000]).unwrap();

    let files = scan::collect_inputs(&[fx.inputs.clone()]).unwrap();
    assert_eq!(files.len(), 3);

    let (tx, rx) = mpsc::channel();
    let report = upload::process_files(
        &RustBackend::new(),
        &fx.gateway,
        &fx.gate,
        &files,
        &target(),
        Some(tx),
    )
    .unwrap();

    assert_eq!(report.uploaded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].0.ends_with("c-broken.jpg"));

    let landscape = &report.uploaded[0].photo;
    assert_eq!((landscape.width, landscape.height), (300, 200));
    assert!(landscape.object_key.ends_with("-a-landscape.jpg"));
    assert!(landscape.url.starts_with("https://photos.example.org/o/"));
    assert_eq!(landscape.filter_settings, FilterSettings::default());
    let stored = fs::read(fx.gateway.object_path(&landscape.object_key)).unwrap();
    assert!(stored.len() <= 100_000);
    assert_eq!(image::guess_format(&stored).unwrap(), ImageFormat::Jpeg);

    let portrait = &report.uploaded[1].photo;
    assert_eq!((portrait.width, portrait.height), (120, 300));

    let listed: Vec<u64> = fx.gateway.list().unwrap().iter().map(|p| p.id).collect();
    assert_eq!(listed, vec![portrait.id, landscape.id]);

    let events: Vec<UploadEvent> = rx.iter().collect();
    assert_eq!(events.len(), 6);
    assert!(matches!(
        events.last(),
        Some(UploadEvent::Failed { index: 3, .. })
    ));
}

#[test]
fn wrong_token_uploads_nothing() {
    let fx = fixture();
    let file = write_gradient(&fx.inputs, "a.png", 64, 64);
    let digest = token_digest(TOKEN);
    let gate = TokenGate::new(Some(digest.as_str()), Some("guess"));

    let result = upload::process_files(
        &RustBackend::new(),
        &fx.gateway,
        &gate,
        &[file],
        &target(),
        None,
    );

    assert!(matches!(
        result,
        Err(UploadError::Auth(AuthError::SignedOut))
    ));
    assert!(fx.gateway.list().unwrap().is_empty());
}

#[test]
fn small_upload_is_stored_byte_for_byte() {
    let fx = fixture();
    let file = write_gradient(&fx.inputs, "tiny.png", 48, 32);
    let original = fs::read(&file).unwrap();

    let blob = scan::load_blob(&file).unwrap();
    let uploaded =
        upload::upload_photo(&RustBackend::new(), &fx.gateway, &fx.gate, blob, &target()).unwrap();

    assert!(uploaded.photo.object_key.ends_with("-tiny.png"));
    assert_eq!((uploaded.photo.width, uploaded.photo.height), (48, 32));
    let stored = fs::read(fx.gateway.object_path(&uploaded.photo.object_key)).unwrap();
    assert_eq!(stored, original);
}

#[test]
fn filter_edit_and_delete_lifecycle() {
    let fx = fixture();
    let tinted = FilterSettings {
        color: "#223344".to_string(),
        opacity: 60,
        blend_mode: BlendMode::SoftLight,
    };
    upload::update_filter(&fx.gateway, &fx.gate, &tinted).unwrap();

    let file = write_gradient(&fx.inputs, "harbour.png", 80, 40);
    let photo = upload::upload_photo(
        &RustBackend::new(),
        &fx.gateway,
        &fx.gate,
        scan::load_blob(&file).unwrap(),
        &target(),
    )
    .unwrap()
    .photo;
    assert_eq!(photo.filter_settings, tinted);

    let edited = upload::edit_photo(
        &fx.gateway,
        &fx.gate,
        photo.id,
        PhotoDetails::from_input(Some(" Harbour at dusk "), None, Some("1/60"), None, Some("800")),
    )
    .unwrap();
    assert_eq!(edited.caption.as_deref(), Some("Harbour at dusk"));
    assert_eq!(fx.gateway.get(photo.id).unwrap().iso.as_deref(), Some("800"));

    upload::delete_photo(&fx.gateway, &fx.gate, photo.id).unwrap();
    assert!(fx.gateway.list().unwrap().is_empty());
    assert!(!fx.gateway.object_path(&photo.object_key).exists());
}

#[test]
fn avif_upload_records_compressed_dimensions() {
    let fx = fixture();
    let file = write_gradient(&fx.inputs, "dunes.tif", 400, 300);
    let t = CompressionTarget {
        output_mime_type: OutputFormat::Avif,
        max_bytes: 50_000,
        max_dimension: 128,
        ..CompressionTarget::default()
    };

    let uploaded = upload::upload_photo(
        &RustBackend::new(),
        &fx.gateway,
        &fx.gate,
        scan::load_blob(&file).unwrap(),
        &t,
    )
    .unwrap();

    let photo = &uploaded.photo;
    assert!(photo.object_key.ends_with("-dunes.avif"));
    assert_eq!((photo.width, photo.height), (128, 96));
    assert!(fx.gateway.object_path(&photo.object_key).exists());
    assert_eq!(fx.gateway.list().unwrap().len(), 1);
}
