//! Compress files from disk into an output directory.
//!
//! ```text
//! a/photo.png ─┐                     ┌─→ out/photo.jpg
//! b/photo.jpg ─┼─ load ─→ compress ──┼─→ out/photo-2.jpg
//! c/broken.jpg ┘  (parallel)         └─→ Error: Decode error: …
//! ```
//!
//! Loading and compression run on the rayon pool; writing happens afterwards
//! in input order, so output names are deterministic. Each input keeps its
//! own slot in the returned list: a file that cannot be read, decoded or
//! written fails alone and its siblings carry on.
//!
//! Output names are the input stem plus the extension of the format actually
//! written. Two inputs that would land on the same name (compared without
//! case, for case-insensitive filesystems) get `-2`, `-3`, … suffixes.

use crate::compress::{CompressError, CompressionResult, CompressionTarget, compress_with_backend};
use crate::imaging::{ImageBackend, OutputFormat};
use crate::scan::{ScanError, load_blob};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Could not read input: {0}")]
    Read(#[from] ScanError),
    #[error(transparent)]
    Compress(#[from] CompressError),
    #[error("Could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A compressed input and where it was written.
#[derive(Debug)]
pub struct ExportedImage {
    pub result: CompressionResult,
    pub original_bytes: u64,
    pub saved_to: PathBuf,
}

/// Compress every file and write the outputs into `out_dir`.
///
/// Only failing to create `out_dir` aborts the run. Everything else is
/// reported per file, in input order.
pub fn compress_files<B: ImageBackend>(
    backend: &B,
    files: &[PathBuf],
    target: &CompressionTarget,
    out_dir: &Path,
) -> io::Result<Vec<Result<ExportedImage, ExportError>>> {
    fs::create_dir_all(out_dir)?;

    let compressed: Vec<_> = files
        .par_iter()
        .map(|path| -> Result<(u64, CompressionResult), ExportError> {
            let blob = load_blob(path)?;
            let original_bytes = blob.byte_len();
            let result = compress_with_backend(backend, blob, target)?;
            Ok((original_bytes, result))
        })
        .collect();

    let mut claimed = HashSet::new();
    Ok(files
        .iter()
        .zip(compressed)
        .map(|(path, outcome)| -> Result<ExportedImage, ExportError> {
            let (original_bytes, result) = outcome?;
            let name = claim_name(
                &mut claimed,
                output_file_name(path, result.blob.mime_type()),
            );
            let saved_to = out_dir.join(name);
            fs::write(&saved_to, result.blob.bytes()).map_err(|source| ExportError::Write {
                path: saved_to.clone(),
                source,
            })?;
            debug!(input = %path.display(), output = %saved_to.display(), "wrote compressed image");
            Ok(ExportedImage {
                result,
                original_bytes,
                saved_to,
            })
        })
        .collect())
}

/// Input stem with the extension of the format actually written.
///
/// An untouched input in a format we never write keeps its file name.
pub fn output_file_name(input: &Path, mime_type: &str) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    match OutputFormat::from_mime(mime_type) {
        Some(format) => format!("{}.{}", stem, format.extension()),
        None => input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(stem),
    }
}

/// Reserve `name`, or the first free `{stem}-N.{ext}` variant of it.
fn claim_name(claimed: &mut HashSet<String>, name: String) -> String {
    if claimed.insert(name.to_lowercase()) {
        return name;
    }
    let path = Path::new(&name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
    let mut n = 2;
    loop {
        let candidate = match &ext {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        };
        if claimed.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n += 1;
    }
}
