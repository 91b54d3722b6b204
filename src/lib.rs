//! # Friendsta
//!
//! The back end of a small photo-sharing gallery. Users upload photos; each
//! upload is compressed to a byte budget, stored, and listed newest first
//! under a shared color overlay.
//!
//! # Architecture
//!
//! ```text
//! scan        paths     →  image files      (walkdir, extension filter)
//! compress    ImageBlob →  CompressionResult (byte-budget encoder)
//! gallery     result    →  stored object + photo row
//! ```
//!
//! The compressor is the core. Everything it needs from pixels goes through
//! the [`imaging::ImageBackend`] trait, so its control flow is tested against
//! a recording mock while [`imaging::RustBackend`] does the real work with the
//! `image` crate.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`compress`] | Adaptive compression: scale to `max_dimension`, step quality down until under `max_bytes` |
//! | [`imaging`] | Backend trait, pure-Rust backend, dimension and quality-schedule math |
//! | [`gallery`] | Gateway (objects + photo table), sign-in gate, upload/edit/delete, filter settings |
//! | [`export`] | Compresses files into an output directory with collision-free names |
//! | [`scan`] | Expands CLI paths into image files and loads them as blobs |
//! | [`config`] | `friendsta.toml` loading, merging over stock defaults, validation |
//! | [`types`] | Shared value types (`Dimensions`, `ImageBlob`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Bounded Quality Loop
//!
//! The quality factors to try are computed up front
//! ([`imaging::calculations::quality_schedule`]): strictly decreasing, with
//! the last entry clamped to exactly `min_quality`. The encoder loop walks
//! that list and stops at the first fit, so the number of attempts is known
//! before the first encode and floating-point drift can never skip the floor.
//!
//! ## Soft Failure at the Floor
//!
//! An image that is still too large at `min_quality` is returned anyway with
//! `met_budget = false`. Uploads store it and log a warning; the caller
//! decides whether that is acceptable. Decode and encode errors are hard
//! failures for that one image only.
//!
//! ## Untouched Small Inputs
//!
//! Inputs already within the byte budget are returned bit-for-bit, even if
//! their pixel dimensions exceed `max_dimension`. Compressing a compliant
//! output again is therefore a no-op.

pub mod compress;
pub mod config;
pub mod export;
pub mod gallery;
pub mod imaging;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
