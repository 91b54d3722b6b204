//! Input discovery.
//!
//! Expands the paths given on the command line into the list of image files
//! to process, and loads a file into an [`ImageBlob`].
//!
//! ```text
//! friendsta upload ~/Pictures/trip  beach.jpg  notes.txt
//!                  └── walked       └── kept   └── skipped (no decoder)
//! ```
//!
//! Directories are walked recursively. A file counts as an image when its
//! extension has a compiled-in decoder ([`supported_input_extensions`]).
//! Hidden entries (dot files and dot directories) are skipped. The result is
//! sorted and de-duplicated so repeated or overlapping arguments process each
//! file once.

use crate::imaging::{mime_for_path, supported_input_extensions};
use crate::types::ImageBlob;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },
    #[error("Input not found: {0}")]
    NotFound(PathBuf),
}

/// Expand files and directories into a sorted, de-duplicated image list.
///
/// Explicitly named files must exist but are otherwise kept only if they
/// look like images, same as walked files.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            return Err(ScanError::NotFound(path.clone()));
        }
        if path.is_file() {
            if is_image(path) {
                files.push(path.clone());
            }
            continue;
        }
        for entry in WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        {
            let entry = entry.map_err(|e| ScanError::Walk {
                path: path.clone(),
                message: e.to_string(),
            })?;
            if entry.file_type().is_file() && is_image(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Read a file into a blob named after the file, with a MIME type guessed
/// from its extension. The compressor sniffs the real format from content.
pub fn load_blob(path: &Path) -> Result<ImageBlob, ScanError> {
    let bytes = fs::read(path)?;
    let blob = ImageBlob::new(bytes, mime_for_path(path));
    Ok(match path.file_name() {
        Some(name) => blob.with_name(name.to_string_lossy()),
        None => blob,
    })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    supported_input_extensions().contains(&ext.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"x").unwrap();
        path
    }

    fn names(files: &[PathBuf], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn walks_directories_recursively() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b.jpg");
        touch(tmp.path(), "a.png");
        touch(tmp.path(), "trip/day1/c.JPEG");
        touch(tmp.path(), "trip/notes.txt");

        let files = collect_inputs(&[tmp.path().to_path_buf()]).unwrap();

        assert_eq!(
            names(&files, tmp.path()),
            vec!["a.png", "b.jpg", "trip/day1/c.JPEG"]
        );
    }

    #[test]
    fn skips_hidden_entries() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), ".thumbs/a.jpg");
        touch(tmp.path(), ".cover.jpg");
        touch(tmp.path(), "visible.jpg");

        let files = collect_inputs(&[tmp.path().to_path_buf()]).unwrap();

        assert_eq!(names(&files, tmp.path()), vec!["visible.jpg"]);
    }

    #[test]
    fn overlapping_arguments_are_deduplicated() {
        let tmp = TempDir::new().unwrap();
        let file = touch(tmp.path(), "a.jpg");

        let files = collect_inputs(&[tmp.path().to_path_buf(), file.clone(), file]).unwrap();

        assert_eq!(files.len(), 1);
    }

    #[test]
    fn explicit_non_image_file_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let notes = touch(tmp.path(), "notes.txt");
        assert!(collect_inputs(&[notes]).unwrap().is_empty());
    }

    #[test]
    fn missing_input_is_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.jpg");
        assert!(matches!(
            collect_inputs(&[missing]),
            Err(ScanError::NotFound(_))
        ));
    }

    #[test]
    fn load_blob_sets_name_and_mime() {
        let tmp = TempDir::new().unwrap();
        let path = touch(tmp.path(), "beach.png");

        let blob = load_blob(&path).unwrap();

        assert_eq!(blob.name(), Some("beach.png"));
        assert_eq!(blob.mime_type(), "image/png");
        assert_eq!(blob.bytes(), b"x");
    }

    #[test]
    fn load_blob_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            load_blob(&tmp.path().join("gone.jpg")),
            Err(ScanError::Io(_))
        ));
    }
}
