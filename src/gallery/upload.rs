//! Upload, edit and delete: the gallery's mutating operations.
//!
//! Upload is the one caller of the compressor in the gallery:
//!
//! ```text
//! file ─→ load ─→ compress ─→ probe ─→ store object ─→ insert row
//!                 (budget)    (w×h)    "{millis}-{name}"  + filter settings
//! ```
//!
//! A batch is processed sequentially, so at most one decoded image is in
//! memory at a time. Each file succeeds or fails on its own; a failure is
//! reported for that file and the batch carries on. Progress is streamed as
//! [`UploadEvent`]s over an optional channel so the CLI can print while the
//! batch runs.
//!
//! Every operation here requires a signed-in [`AuthGate`].

use super::auth::{AuthError, AuthGate, require_signed_in};
use super::filter::{FilterError, FilterSettings};
use super::photo::{NewPhoto, PhotoDetails, PhotoRecord};
use super::store::{GatewayError, PhotoGateway};
use crate::compress::{CompressError, CompressionTarget, compress_with_backend};
use crate::imaging::{BackendError, ImageBackend, OutputFormat, Quality};
use crate::scan::{ScanError, load_blob};
use crate::types::ImageBlob;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum UploadError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Could not read input: {0}")]
    Scan(#[from] ScanError),
    #[error("Compression failed: {0}")]
    Compress(#[from] CompressError),
    #[error("Could not read compressed image: {0}")]
    Probe(#[from] BackendError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("Invalid filter: {0}")]
    Filter(#[from] FilterError),
}

/// Progress of a batch upload.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    Started {
        index: usize,
        total: usize,
        name: String,
    },
    Uploaded {
        index: usize,
        name: String,
        photo: PhotoRecord,
        original_bytes: u64,
        stored_bytes: u64,
        quality: Quality,
        met_budget: bool,
    },
    Failed {
        index: usize,
        name: String,
        error: String,
    },
}

/// A successfully uploaded photo with its compression outcome.
#[derive(Debug, Clone)]
pub struct UploadedPhoto {
    pub photo: PhotoRecord,
    pub original_bytes: u64,
    pub stored_bytes: u64,
    pub quality: Quality,
    pub met_budget: bool,
}

/// Outcome of [`process_files`].
#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploaded: Vec<UploadedPhoto>,
    pub failed: Vec<(PathBuf, UploadError)>,
}

impl UploadReport {
    pub fn total(&self) -> usize {
        self.uploaded.len() + self.failed.len()
    }
}

/// Compress one image, store it, and insert its row.
///
/// The row carries the gallery's current filter settings. If the insert
/// fails after the object was stored, the object is left in place.
pub fn upload_photo<B: ImageBackend, G: PhotoGateway + ?Sized>(
    backend: &B,
    gateway: &G,
    gate: &dyn AuthGate,
    blob: ImageBlob,
    target: &CompressionTarget,
) -> Result<UploadedPhoto, UploadError> {
    require_signed_in(gate)?;

    let name = blob.name().unwrap_or("photo").to_string();
    let original_bytes = blob.byte_len();
    let filter_settings = gateway.load_filter()?;

    let result = compress_with_backend(backend, blob, target)?;
    // Re-encoded output has the dimensions the compressor resampled to;
    // an untouched input is probed before anything is stored.
    let dimensions = if result.was_reencoded() {
        result.dimensions
    } else {
        backend.identify(&result.blob)?
    };
    let key = object_key(next_key_millis(), &name, result.blob.mime_type());
    let url = gateway.store_object(&key, &result.blob)?;

    let photo = gateway.insert(NewPhoto {
        url,
        object_key: key,
        width: dimensions.width,
        height: dimensions.height,
        filter_settings,
    })?;

    info!(
        id = photo.id,
        name = %name,
        original_bytes,
        stored_bytes = result.blob.byte_len(),
        quality = %result.quality,
        met_budget = result.met_budget,
        "uploaded photo"
    );
    if !result.met_budget {
        warn!(name = %name, "stored above the byte budget at the quality floor");
    }

    Ok(UploadedPhoto {
        photo,
        original_bytes,
        stored_bytes: result.blob.byte_len(),
        quality: result.quality,
        met_budget: result.met_budget,
    })
}

/// Upload files one after another.
///
/// Only a signed-out gate fails the whole batch, and it does so before any
/// file is touched. Per-file failures land in [`UploadReport::failed`].
pub fn process_files<B: ImageBackend, G: PhotoGateway + ?Sized>(
    backend: &B,
    gateway: &G,
    gate: &dyn AuthGate,
    files: &[PathBuf],
    target: &CompressionTarget,
    progress: Option<Sender<UploadEvent>>,
) -> Result<UploadReport, UploadError> {
    require_signed_in(gate)?;

    let total = files.len();
    let mut report = UploadReport::default();
    let send = |event: UploadEvent| {
        if let Some(tx) = &progress {
            // A dropped receiver only means nobody is watching
            let _ = tx.send(event);
        }
    };

    for (i, path) in files.iter().enumerate() {
        let index = i + 1;
        let name = display_name(path);
        send(UploadEvent::Started {
            index,
            total,
            name: name.clone(),
        });

        let outcome = load_blob(path)
            .map_err(UploadError::from)
            .and_then(|blob| upload_photo(backend, gateway, gate, blob, target));

        match outcome {
            Ok(uploaded) => {
                send(UploadEvent::Uploaded {
                    index,
                    name,
                    photo: uploaded.photo.clone(),
                    original_bytes: uploaded.original_bytes,
                    stored_bytes: uploaded.stored_bytes,
                    quality: uploaded.quality,
                    met_budget: uploaded.met_budget,
                });
                report.uploaded.push(uploaded);
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err, "upload failed");
                send(UploadEvent::Failed {
                    index,
                    name,
                    error: err.to_string(),
                });
                report.failed.push((path.clone(), err));
            }
        }
    }

    Ok(report)
}

/// Replace a photo's editable details.
pub fn edit_photo<G: PhotoGateway + ?Sized>(
    gateway: &G,
    gate: &dyn AuthGate,
    id: u64,
    details: PhotoDetails,
) -> Result<PhotoRecord, UploadError> {
    require_signed_in(gate)?;
    let photo = gateway.update_details(id, details.normalized())?;
    info!(id, "updated photo details");
    Ok(photo)
}

/// Remove a photo's object, then its row.
///
/// A failure to remove the object is logged and does not stop the row from
/// being deleted, so a photo never stays listed after a delete.
pub fn delete_photo<G: PhotoGateway + ?Sized>(
    gateway: &G,
    gate: &dyn AuthGate,
    id: u64,
) -> Result<PhotoRecord, UploadError> {
    require_signed_in(gate)?;
    let photo = gateway.get(id)?;
    if let Err(err) = gateway.remove_object(&photo.object_key) {
        warn!(id, key = %photo.object_key, error = %err, "could not remove stored object");
    }
    gateway.delete(id)?;
    info!(id, "deleted photo");
    Ok(photo)
}

/// Validate and save the gallery-wide filter settings.
///
/// Existing photos keep the settings they were uploaded with.
pub fn update_filter<G: PhotoGateway + ?Sized>(
    gateway: &G,
    gate: &dyn AuthGate,
    filter: &FilterSettings,
) -> Result<(), UploadError> {
    require_signed_in(gate)?;
    filter.validate()?;
    gateway.save_filter(filter)?;
    info!(color = %filter.color, opacity = filter.opacity, blend = %filter.blend_mode, "saved filter settings");
    Ok(())
}

static LAST_KEY_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Current unix time in milliseconds, bumped past the previous key's so two
/// uploads in the same millisecond still get distinct keys.
fn next_key_millis() -> i64 {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_KEY_MILLIS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(previous + 1)
}

/// `"{millis}-{file name}"`, with the extension matching the stored format.
///
/// Path separators in the name are replaced so the key stays flat.
fn object_key(millis: i64, name: &str, mime_type: &str) -> String {
    let flat = name.replace(['/', '\\'], "_");
    let file_name = match OutputFormat::from_mime(mime_type) {
        Some(format) => {
            let stem = Path::new(&flat)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "photo".to_string());
            format!("{stem}.{}", format.extension())
        }
        None => flat,
    };
    format!("{millis}-{file_name}")
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
