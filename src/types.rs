//! Shared types passed between the compressor, the backend, and the gallery.
//!
//! [`ImageBlob`] is the unit of exchange: the compressor consumes one and
//! produces one, the upload gateway stores one. Its bytes are immutable once
//! constructed. Transformations always produce a new blob.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height. Zero-height images report 0.
    pub fn aspect_ratio(self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /// The larger of the two axes.
    pub fn long_edge(self) -> u32 {
        self.width.max(self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An encoded image payload with its declared MIME type.
///
/// The declared type is what the producer claims; decoders sniff the actual
/// format from the bytes. The optional `name` is carried through for display
/// and object-key generation and never affects encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBlob {
    bytes: Vec<u8>,
    mime_type: String,
    name: Option<String>,
}

impl ImageBlob {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            name: None,
        }
    }

    /// Attach a file name (builder style).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn byte_len(&self) -> u64 {
        self.bytes.len() as u64
    }
}

// Payloads run to megabytes; keep Debug output readable.
impl fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBlob")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("byte_len", &self.bytes.len())
            .finish()
    }
}
