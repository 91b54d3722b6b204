//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` (header only) |
//! | **Decode** | `image` crate decoders, format sniffed from bytes |
//! | **Resample** | `resize_exact` with a pinned filter (Lanczos3 by default) |
//! | **Encode** | JPEG / AVIF with quality, PNG / WebP lossless |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and quality math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
pub mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use params::{EncodeParams, OutputFormat, Quality, ResampleFilter, ResampleParams};
pub use rust_backend::{RustBackend, mime_for_path, supported_input_extensions};
