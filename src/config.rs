//! Gallery configuration.
//!
//! Handles loading, validating, and merging `friendsta.toml`. User values are
//! merged over the stock defaults, so a config file only needs the keys it
//! wants to change. A missing file means "all defaults".
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [compression]
//! max_bytes = 512000          # Byte budget per stored image
//! max_dimension = 2048        # Longest edge in pixels
//! initial_quality = 0.9       # First quality attempt (0-1]
//! quality_step = 0.1          # Quality decrement per attempt
//! min_quality = 0.1           # Quality floor
//! output_mime_type = "image/jpeg"
//! resample_filter = "lanczos3"
//!
//! [storage]
//! data_dir = "friendsta-data"
//! public_base_url = "http://localhost:8080/photos"
//!
//! [auth]
//! admin_token_sha256 = "…"    # SHA-256 hex of the admin token
//!
//! [processing]
//! max_processes = 4           # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::compress::CompressionTarget;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `friendsta.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Byte budget and encoding settings for uploads.
    pub compression: CompressionTarget,
    /// Where photos and the photo table live.
    pub storage: StorageConfig,
    /// Admin credentials.
    pub auth: AuthConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.compression
            .validate()
            .map_err(|e| ConfigError::Validation(format!("compression: {e}")))?;
        if self.storage.public_base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "storage.public_base_url must not be empty".into(),
            ));
        }
        let well_formed =
            |digest: &String| digest.len() == 64 && digest.chars().all(|c| c.is_ascii_hexdigit());
        if !self.auth.admin_token_sha256.iter().all(well_formed) {
            return Err(ConfigError::Validation(
                "auth.admin_token_sha256 must be 64 hex characters".into(),
            ));
        }
        Ok(())
    }
}

/// Storage location settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding `objects/`, `photos.json` and `filter.json`.
    pub data_dir: PathBuf,
    /// Prefix for public photo URLs; the object key is appended.
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("friendsta-data"),
            public_base_url: "http://localhost:8080/photos".to_string(),
        }
    }
}

/// Admin credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// SHA-256 hex digest of the admin token. When absent nobody can sign
    /// in, so uploads, edits and deletes are refused.
    pub admin_token_sha256: Option<String>,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel compression workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(GalleryConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file path.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<GalleryConfig, ConfigError> {
    resolve_config(stock_defaults_value()?, load_raw_config(path)?)
}

/// Returns a fully-commented stock `friendsta.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Friendsta Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Compression applied to every upload
# ---------------------------------------------------------------------------
[compression]
# Byte budget per stored image. Smaller inputs are stored untouched.
max_bytes = 512000

# Longest edge in pixels. Larger images are scaled down, never up.
max_dimension = 2048

# Quality factors (0-1] for lossy encoders. Attempts start at
# initial_quality and step down until the image fits or min_quality is reached.
initial_quality = 0.9
quality_step = 0.1
min_quality = 0.1

# Output format: image/jpeg, image/png, image/webp or image/avif.
# PNG and WebP are lossless here, so quality has no effect on them.
output_mime_type = "image/jpeg"

# Resampling filter: nearest, triangle, catmull-rom, gaussian, lanczos3.
resample_filter = "lanczos3"

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[storage]
# Holds objects/, photos.json and filter.json.
data_dir = "friendsta-data"

# Public URL prefix; the object key is appended after a slash.
public_base_url = "http://localhost:8080/photos"

# ---------------------------------------------------------------------------
# Admin sign-in
# ---------------------------------------------------------------------------
[auth]
# SHA-256 hex digest of the admin token, e.g. from:
#   printf %s 'my-token' | sha256sum
# Pass the token itself with --token or FRIENDSTA_TOKEN.
# admin_token_sha256 = "..."

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel compression workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
