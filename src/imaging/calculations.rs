//! Pure calculation functions for compression planning.
//!
//! All functions here are pure and testable without any I/O or images.

use crate::types::Dimensions;

/// Tolerance used when comparing quality factors.
///
/// Stepping `0.9` down by `0.1` eight times lands on `0.0999…`, not `0.1`;
/// anything within this distance of the floor counts as the floor.
pub const QUALITY_EPSILON: f64 = 1e-9;

/// Fit dimensions inside a square bounding box, preserving aspect ratio.
///
/// If either axis exceeds `max_dimension`, the longer axis maps exactly to
/// `max_dimension` and the other is rounded to the nearest pixel (never
/// below 1). Otherwise the dimensions are returned unchanged; images are
/// never upscaled.
///
/// # Examples
/// ```
/// # use friendsta::imaging::calculations::fit_within;
/// # use friendsta::types::Dimensions;
/// assert_eq!(fit_within(Dimensions::new(3000, 1500), 2048), Dimensions::new(2048, 1024));
/// assert_eq!(fit_within(Dimensions::new(400, 400), 2048), Dimensions::new(400, 400));
/// ```
pub fn fit_within(original: Dimensions, max_dimension: u32) -> Dimensions {
    let Dimensions { width, height } = original;
    if width <= max_dimension && height <= max_dimension {
        return original;
    }

    if width > height {
        let h = (height as f64 * max_dimension as f64 / width as f64).round() as u32;
        Dimensions::new(max_dimension, h.max(1))
    } else {
        let w = (width as f64 * max_dimension as f64 / height as f64).round() as u32;
        Dimensions::new(w.max(1), max_dimension)
    }
}

/// Most quality steps a schedule may take between `initial` and `floor`.
///
/// Targets needing more are rejected as invalid; every attempt is a full
/// encode of the image.
pub const MAX_QUALITY_STEPS: usize = 100;

/// Upper bound on encoding attempts for a quality schedule:
/// `ceil((initial - floor) / step) + 1`.
///
/// Saturates instead of overflowing when `step` is vanishingly small.
pub fn max_attempts(initial: f64, step: f64, floor: f64) -> usize {
    let span = (initial - floor).max(0.0);
    let steps = (span / step - QUALITY_EPSILON).ceil().max(0.0);
    // `as` saturates at usize::MAX for infinity
    (steps as usize).saturating_add(1)
}

/// Quality factors to try, in order.
///
/// Starts at `initial` and decreases by `step`. The final entry is clamped to
/// exactly `floor`, so the sequence is strictly decreasing, bounded below by
/// `floor`, and never longer than [`max_attempts`] or
/// `MAX_QUALITY_STEPS + 1`.
pub fn quality_schedule(initial: f64, step: f64, floor: f64) -> Vec<f64> {
    let attempts = max_attempts(initial, step, floor).min(MAX_QUALITY_STEPS + 1);
    let mut schedule: Vec<f64> = Vec::with_capacity(attempts);
    for i in 0..attempts - 1 {
        // Multiply rather than accumulate to keep float drift from compounding
        let q = initial - step * i as f64;
        let stalled = schedule.last().is_some_and(|&previous| q >= previous);
        if q <= floor + QUALITY_EPSILON || stalled {
            break;
        }
        schedule.push(q);
    }
    schedule.push(floor);
    schedule
}

/// Whether a quality factor has reached the floor.
pub fn at_floor(quality: f64, floor: f64) -> bool {
    quality <= floor + QUALITY_EPSILON
}

/// Whether `output` keeps the aspect ratio of `input` to within one pixel.
///
/// The longer axis of a downscaled image is exact; only the shorter axis is
/// rounded. The check compares that axis against its exact scaled length.
pub fn aspect_preserved(input: Dimensions, output: Dimensions) -> bool {
    // A degenerate input has no ratio to keep
    if input.width == 0 || input.height == 0 {
        return true;
    }
    let drift = if input.width >= input.height {
        let exact = input.height as f64 * output.width as f64 / input.width as f64;
        (output.height as f64 - exact).abs()
    } else {
        let exact = input.width as f64 * output.height as f64 / input.height as f64;
        (output.width as f64 - exact).abs()
    };
    drift <= 1.0
}
