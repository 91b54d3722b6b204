//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations the compressor
//! needs: identify, decode, resample, and encode. The pixel surface is an
//! associated type, so the compressor never names a concrete image library.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust and built on the
//! `image` crate. Tests use the recording `MockBackend` in this module.

use super::params::{EncodeParams, ResampleParams};
use crate::types::{Dimensions, ImageBlob};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Trait for image processing backends.
///
/// Every backend must implement all four operations so the compressor and
/// the upload pipeline stay backend-agnostic. `identify` doubles as the
/// Dimension Prober: it must succeed for any blob `decode` accepts.
pub trait ImageBackend: Sync {
    /// Decoded, in-memory pixel surface.
    type Surface: Send;

    /// Read pixel dimensions, ideally from the header alone.
    fn identify(&self, blob: &ImageBlob) -> Result<Dimensions, BackendError>;

    /// Decode the blob at its original resolution.
    fn decode(&self, blob: &ImageBlob) -> Result<Self::Surface, BackendError>;

    /// Resample a surface to exact dimensions.
    fn resample(&self, surface: Self::Surface, params: &ResampleParams) -> Self::Surface;

    /// Encode a surface, returning the encoded bytes.
    fn encode(&self, surface: &Self::Surface, params: &EncodeParams)
    -> Result<Vec<u8>, BackendError>;
}
