//! Adaptive image compression to a byte budget.
//!
//! Given an encoded image and a [`CompressionTarget`], produce an image that
//! fits the byte budget (or the best achievable at the quality floor) while
//! bounding pixel dimensions and preserving aspect ratio.
//!
//! ## Pipeline
//!
//! ```text
//! identify ─┬─ byte_len ≤ max_bytes ──→ return input untouched
//!           └─ otherwise → fit_within(max_dimension) → decode → resample
//!                          → encode at q0, q0-step, … until ≤ max_bytes or q ≤ floor
//! ```
//!
//! The quality loop is an explicit, bounded iteration over a precomputed
//! schedule ([`quality_schedule`]), so termination within
//! `ceil((initial - floor) / step) + 1` attempts is structural.
//!
//! Failing to meet the budget at the floor is a soft failure: the result is
//! still returned with `met_budget = false`. Decode and encode failures are
//! hard errors for that one call; [`compress_batch`] keeps them isolated so a
//! bad file never takes its siblings down.
//!
//! This module performs no I/O and no logging. Callers decide what to report.

use crate::imaging::calculations::{
    MAX_QUALITY_STEPS, aspect_preserved, at_floor, fit_within, max_attempts,
    quality_schedule,
};
use crate::imaging::{
    BackendError, EncodeParams, ImageBackend, OutputFormat, Quality, ResampleFilter,
    ResampleParams, RustBackend,
};
use crate::types::{Dimensions, ImageBlob};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("Invalid compression target: {0}")]
    InvalidTarget(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Encode error: {0}")]
    Encode(String),
}

impl From<BackendError> for CompressError {
    fn from(err: BackendError) -> Self {
        match err {
            // Reading from an in-memory blob only fails when the payload is unreadable
            BackendError::Io(e) => CompressError::Decode(e.to_string()),
            BackendError::Decode(msg) => CompressError::Decode(msg),
            BackendError::Encode(msg) => CompressError::Encode(msg),
        }
    }
}

/// Budget and encoding settings for one compression call.
///
/// Also the `[compression]` section of `friendsta.toml`; every field is
/// optional there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionTarget {
    /// Maximum encoded size in bytes.
    pub max_bytes: u64,
    /// Maximum pixel size of either axis.
    pub max_dimension: u32,
    /// First quality factor tried (0–1).
    pub initial_quality: f64,
    /// Decrease in quality between attempts.
    pub quality_step: f64,
    /// Quality floor; the last attempt runs exactly here.
    pub min_quality: f64,
    /// Output encoding, as a MIME type.
    pub output_mime_type: OutputFormat,
    /// Filter used when downscaling.
    pub resample_filter: ResampleFilter,
}

impl Default for CompressionTarget {
    fn default() -> Self {
        Self {
            max_bytes: 512_000,
            max_dimension: 2048,
            initial_quality: 0.9,
            quality_step: 0.1,
            min_quality: 0.1,
            output_mime_type: OutputFormat::Jpeg,
            resample_filter: ResampleFilter::Lanczos3,
        }
    }
}

impl CompressionTarget {
    /// Check the target's preconditions:
    /// `max_bytes > 0`, `max_dimension ≥ 1`, `quality_step > 0`,
    /// `0 < min_quality ≤ initial_quality ≤ 1`, and at most
    /// [`MAX_QUALITY_STEPS`] steps from `initial_quality` down to the floor.
    pub fn validate(&self) -> Result<(), CompressError> {
        let invalid = |msg: &str| Err(CompressError::InvalidTarget(msg.to_string()));

        if self.max_bytes == 0 {
            return invalid("max_bytes must be positive");
        }
        if self.max_dimension == 0 {
            return invalid("max_dimension must be at least 1");
        }
        // Negated comparisons so NaN is rejected too
        if !(self.quality_step > 0.0 && self.quality_step.is_finite()) {
            return invalid("quality_step must be positive");
        }
        if !(self.min_quality > 0.0) {
            return invalid("min_quality must be positive");
        }
        if !(self.min_quality <= self.initial_quality) {
            return invalid("min_quality must not exceed initial_quality");
        }
        if !(self.initial_quality <= 1.0) {
            return invalid("initial_quality must not exceed 1.0");
        }
        if self.max_attempts() > MAX_QUALITY_STEPS + 1 {
            return Err(CompressError::InvalidTarget(format!(
                "quality_step is too small: more than {MAX_QUALITY_STEPS} steps from initial_quality to min_quality"
            )));
        }
        Ok(())
    }

    /// Worst-case number of encoding attempts for this target.
    pub fn max_attempts(&self) -> usize {
        max_attempts(self.initial_quality, self.quality_step, self.min_quality)
    }
}

/// Outcome of a compression call.
#[derive(Debug, Clone)]
pub struct CompressionResult {
    /// The output image. The untouched input when no re-encoding happened.
    pub blob: ImageBlob,
    /// Quality factor of the accepted encoding (1.0 when untouched).
    pub quality: Quality,
    /// Pixel dimensions of `blob`.
    pub dimensions: Dimensions,
    /// Pixel dimensions of the input.
    pub original_dimensions: Dimensions,
    /// Whether `blob` fits the byte budget.
    pub met_budget: bool,
    /// Encodings performed; 0 for the short-circuit.
    pub attempts: usize,
}

impl CompressionResult {
    pub fn was_reencoded(&self) -> bool {
        self.attempts > 0
    }
}

/// Compress with the built-in [`RustBackend`].
pub fn compress(
    input: ImageBlob,
    target: &CompressionTarget,
) -> Result<CompressionResult, CompressError> {
    compress_with_backend(&RustBackend::new(), input, target)
}

/// Compress using a specific backend (allows testing with mock).
pub fn compress_with_backend<B: ImageBackend>(
    backend: &B,
    input: ImageBlob,
    target: &CompressionTarget,
) -> Result<CompressionResult, CompressError> {
    target.validate()?;

    let original = backend.identify(&input)?;

    if input.byte_len() <= target.max_bytes {
        return Ok(CompressionResult {
            blob: input,
            quality: Quality::UNTOUCHED,
            dimensions: original,
            original_dimensions: original,
            met_budget: true,
            attempts: 0,
        });
    }

    let dimensions = fit_within(original, target.max_dimension);
    debug_assert!(aspect_preserved(original, dimensions));
    let surface = backend.decode(&input)?;
    let surface = backend.resample(
        surface,
        &ResampleParams {
            dimensions,
            filter: target.resample_filter,
        },
    );
    let name = input.name().map(str::to_owned);
    drop(input);

    let format = target.output_mime_type;
    let mut outcome = None;

    for (index, q) in quality_schedule(
        target.initial_quality,
        target.quality_step,
        target.min_quality,
    )
    .into_iter()
    .enumerate()
    {
        let quality = Quality::new(q);
        let bytes = backend.encode(&surface, &EncodeParams { format, quality })?;
        let met_budget = bytes.len() as u64 <= target.max_bytes;
        let done = met_budget || at_floor(q, target.min_quality);
        outcome = Some((bytes, quality, met_budget, index + 1));
        if done {
            break;
        }
    }

    let (bytes, quality, met_budget, attempts) = outcome
        .ok_or_else(|| CompressError::InvalidTarget("empty quality schedule".to_string()))?;

    let mut blob = ImageBlob::new(bytes, format.mime_type());
    if let Some(name) = name {
        blob = blob.with_name(name);
    }

    Ok(CompressionResult {
        blob,
        quality,
        dimensions,
        original_dimensions: original,
        met_budget,
        attempts,
    })
}

/// Compress many blobs in parallel on the current rayon pool.
///
/// Returns one result per input, in input order. Calls are independent;
/// a failure affects only its own slot.
pub fn compress_batch<B: ImageBackend>(
    backend: &B,
    inputs: Vec<ImageBlob>,
    target: &CompressionTarget,
) -> Vec<Result<CompressionResult, CompressError>> {
    inputs
        .into_par_iter()
        .map(|input| compress_with_backend(backend, input, target))
        .collect()
}
