//! Upload/persistence gateway.
//!
//! The gallery never talks to storage directly; it goes through
//! [`PhotoGateway`], which combines an object store (the encoded image
//! bytes) with a row table (the [`PhotoRecord`]s) and the gallery-wide filter
//! settings.
//!
//! [`LocalGateway`] keeps everything under one data directory:
//!
//! ```text
//! data/
//! ├── objects/
//! │   ├── 1715342400123-beach.jpg
//! │   └── 1715342401456-dunes.jpg
//! ├── photos.json      # { version, next_id, rows: [PhotoRecord…] }
//! └── filter.json      # FilterSettings
//! ```
//!
//! Table writes go through a temp file and a rename so a crash never leaves
//! a half-written `photos.json`. The gateway performs no retries; callers
//! decide what to do with a failure.

use super::filter::FilterSettings;
use super::photo::{NewPhoto, PhotoDetails, PhotoRecord};
use crate::types::ImageBlob;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const OBJECTS_DIR: &str = "objects";
const TABLE_FILENAME: &str = "photos.json";
const FILTER_FILENAME: &str = "filter.json";

/// Version of the photo table format. Tables with another version are
/// refused rather than silently rewritten.
const TABLE_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Photo {0} not found")]
    NotFound(u64),
}

/// The upload/persistence collaborator.
pub trait PhotoGateway {
    /// Store encoded bytes under `key`, returning the public URL.
    fn store_object(&self, key: &str, blob: &ImageBlob) -> Result<String, GatewayError>;

    /// Remove a stored object.
    fn remove_object(&self, key: &str) -> Result<(), GatewayError>;

    /// Insert a row, assigning its id and creation time.
    fn insert(&self, photo: NewPhoto) -> Result<PhotoRecord, GatewayError>;

    /// All rows, newest first.
    fn list(&self) -> Result<Vec<PhotoRecord>, GatewayError>;

    fn get(&self, id: u64) -> Result<PhotoRecord, GatewayError>;

    /// Replace the editable details of a row.
    fn update_details(&self, id: u64, details: PhotoDetails)
    -> Result<PhotoRecord, GatewayError>;

    fn delete(&self, id: u64) -> Result<(), GatewayError>;

    /// Current filter settings, or the defaults when none were saved.
    fn load_filter(&self) -> Result<FilterSettings, GatewayError>;

    fn save_filter(&self, filter: &FilterSettings) -> Result<(), GatewayError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct PhotoTable {
    version: u32,
    next_id: u64,
    rows: Vec<PhotoRecord>,
}

impl PhotoTable {
    fn empty() -> Self {
        Self {
            version: TABLE_VERSION,
            next_id: 1,
            rows: Vec::new(),
        }
    }
}

/// Filesystem-backed gateway rooted at a data directory.
#[derive(Debug, Clone)]
pub struct LocalGateway {
    root: PathBuf,
    public_base_url: String,
}

fn storage(context: &str, err: impl std::fmt::Display) -> GatewayError {
    GatewayError::Storage(format!("{context}: {err}"))
}

fn persistence(context: &str, err: impl std::fmt::Display) -> GatewayError {
    GatewayError::Persistence(format!("{context}: {err}"))
}

/// Object keys are flat file names: no separators, no parent references.
fn validate_key(key: &str) -> Result<(), GatewayError> {
    if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) {
        return Err(GatewayError::Storage(format!("invalid object key '{key}'")));
    }
    Ok(())
}

impl LocalGateway {
    /// Open (and create if needed) a data directory.
    pub fn open(root: &Path, public_base_url: &str) -> Result<Self, GatewayError> {
        fs::create_dir_all(root.join(OBJECTS_DIR))
            .map_err(|e| storage(&format!("creating {}", root.display()), e))?;
        Ok(Self {
            root: root.to_path_buf(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Filesystem location of a stored object.
    pub fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(OBJECTS_DIR).join(key)
    }

    fn table_path(&self) -> PathBuf {
        self.root.join(TABLE_FILENAME)
    }

    fn read_table(&self) -> Result<PhotoTable, GatewayError> {
        let path = self.table_path();
        if !path.exists() {
            return Ok(PhotoTable::empty());
        }
        let content =
            fs::read_to_string(&path).map_err(|e| persistence("reading photo table", e))?;
        let table: PhotoTable =
            serde_json::from_str(&content).map_err(|e| persistence("parsing photo table", e))?;
        if table.version != TABLE_VERSION {
            return Err(GatewayError::Persistence(format!(
                "photo table version {} is not supported (expected {})",
                table.version, TABLE_VERSION
            )));
        }
        Ok(table)
    }

    fn write_table(&self, table: &PhotoTable) -> Result<(), GatewayError> {
        let json =
            serde_json::to_string_pretty(table).map_err(|e| persistence("encoding table", e))?;
        write_atomic(&self.table_path(), json.as_bytes())
            .map_err(|e| persistence("writing photo table", e))
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

impl PhotoGateway for LocalGateway {
    fn store_object(&self, key: &str, blob: &ImageBlob) -> Result<String, GatewayError> {
        validate_key(key)?;
        let path = self.object_path(key);
        if path.exists() {
            return Err(GatewayError::Storage(format!("object '{key}' already exists")));
        }
        fs::write(&path, blob.bytes()).map_err(|e| storage(&format!("writing '{key}'"), e))?;
        debug!(key, bytes = blob.byte_len(), "stored object");
        Ok(format!("{}/{}", self.public_base_url, key))
    }

    fn remove_object(&self, key: &str) -> Result<(), GatewayError> {
        validate_key(key)?;
        fs::remove_file(self.object_path(key))
            .map_err(|e| storage(&format!("removing '{key}'"), e))?;
        debug!(key, "removed object");
        Ok(())
    }

    fn insert(&self, photo: NewPhoto) -> Result<PhotoRecord, GatewayError> {
        let mut table = self.read_table()?;
        let aspect_ratio = photo.aspect_ratio();
        let record = PhotoRecord {
            id: table.next_id,
            url: photo.url,
            object_key: photo.object_key,
            width: photo.width,
            height: photo.height,
            aspect_ratio,
            filter_settings: photo.filter_settings,
            caption: None,
            date_taken: None,
            shutter_speed: None,
            aperture: None,
            iso: None,
            created_at: Utc::now(),
        };
        table.next_id += 1;
        table.rows.push(record.clone());
        self.write_table(&table)?;
        debug!(id = record.id, "inserted photo");
        Ok(record)
    }

    fn list(&self) -> Result<Vec<PhotoRecord>, GatewayError> {
        let mut rows = self.read_table()?.rows;
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(rows)
    }

    fn get(&self, id: u64) -> Result<PhotoRecord, GatewayError> {
        self.read_table()?
            .rows
            .into_iter()
            .find(|row| row.id == id)
            .ok_or(GatewayError::NotFound(id))
    }

    fn update_details(
        &self,
        id: u64,
        details: PhotoDetails,
    ) -> Result<PhotoRecord, GatewayError> {
        let mut table = self.read_table()?;
        let row = table
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(GatewayError::NotFound(id))?;
        row.apply(details.normalized());
        let updated = row.clone();
        self.write_table(&table)?;
        debug!(id, "updated photo details");
        Ok(updated)
    }

    fn delete(&self, id: u64) -> Result<(), GatewayError> {
        let mut table = self.read_table()?;
        let before = table.rows.len();
        table.rows.retain(|row| row.id != id);
        if table.rows.len() == before {
            return Err(GatewayError::NotFound(id));
        }
        self.write_table(&table)?;
        debug!(id, "deleted photo");
        Ok(())
    }

    fn load_filter(&self) -> Result<FilterSettings, GatewayError> {
        let path = self.root.join(FILTER_FILENAME);
        if !path.exists() {
            return Ok(FilterSettings::default());
        }
        let content =
            fs::read_to_string(&path).map_err(|e| persistence("reading filter settings", e))?;
        serde_json::from_str(&content).map_err(|e| persistence("parsing filter settings", e))
    }

    fn save_filter(&self, filter: &FilterSettings) -> Result<(), GatewayError> {
        let json = serde_json::to_string_pretty(filter)
            .map_err(|e| persistence("encoding filter settings", e))?;
        write_atomic(&self.root.join(FILTER_FILENAME), json.as_bytes())
            .map_err(|e| persistence("writing filter settings", e))
    }
}
