//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity (an input file, a stored photo) leads with its positional
//! index or id and its name. Sizes, dimensions, URLs and errors follow as
//! indented context lines.
//!
//! ## Compress
//!
//! ```text
//! 001 beach.jpg
//!     3000x1500 → 2048x1024, 4.2 MB → 481.9 KB at quality 0.70 (3 attempts)
//!     Saved: out/beach.jpg
//! 002 tiny.png
//!     400x400, 80.0 KB, within budget (untouched)
//! 003 broken.jpg
//!     Error: Decode error: …
//!
//! Compressed 3 images: 2 within budget, 0 over budget, 1 failed
//! ```
//!
//! ## Upload
//!
//! ```text
//! [1/2] beach.jpg
//!     #14 → https://cdn.example.com/p/1715342400123-beach.jpg
//!     4.2 MB → 481.9 KB at quality 0.70
//! [2/2] broken.jpg
//!     Error: Compression failed: Decode error: …
//!
//! Uploaded 1 of 2 photos, 1 failed
//! ```
//!
//! ## List
//!
//! ```text
//! #14 1715342400123-beach.jpg (2048x1024, wide)
//!     Caption: Low tide
//!     Taken: 2024-05-01 · 1/250 · f/2.8 · ISO 400
//!     URL: https://cdn.example.com/p/1715342400123-beach.jpg
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::export::{ExportError, ExportedImage};
use crate::gallery::filter::FilterSettings;
use crate::gallery::photo::{LayoutClass, PhotoRecord};
use crate::gallery::upload::{UploadEvent, UploadReport};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count (decimal units).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1000 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1000.0;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

fn attempts_label(attempts: usize) -> String {
    if attempts == 1 {
        "1 attempt".to_string()
    } else {
        format!("{} attempts", attempts)
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Compress
// ============================================================================

/// One compressed input: sizes and dimensions, then where it was saved.
pub fn format_compress_result(
    index: usize,
    name: &str,
    exported: &Result<ExportedImage, ExportError>,
) -> Vec<String> {
    let mut lines = vec![format!("{} {}", format_index(index), name)];
    let (result, original_bytes) = match exported {
        Ok(e) => (&e.result, e.original_bytes),
        Err(e) => {
            lines.push(format!("{}Error: {}", indent(1), e));
            return lines;
        }
    };

    if !result.was_reencoded() {
        lines.push(format!(
            "{}{}, {}, within budget (untouched)",
            indent(1),
            result.dimensions,
            format_bytes(original_bytes)
        ));
    } else {
        let mut detail = format!(
            "{}{} → {}, {} → {} at quality {} ({})",
            indent(1),
            result.original_dimensions,
            result.dimensions,
            format_bytes(original_bytes),
            format_bytes(result.blob.byte_len()),
            result.quality,
            attempts_label(result.attempts)
        );
        if !result.met_budget {
            detail.push_str(", over budget at the quality floor");
        }
        lines.push(detail);
    }

    if let Ok(e) = exported {
        lines.push(format!("{}Saved: {}", indent(1), e.saved_to.display()));
    }
    lines
}

/// Totals line for a compress run.
pub fn format_compress_summary(results: &[Result<ExportedImage, ExportError>]) -> Vec<String> {
    let within = results
        .iter()
        .filter(|r| matches!(r, Ok(e) if e.result.met_budget))
        .count();
    let over = results
        .iter()
        .filter(|r| matches!(r, Ok(e) if !e.result.met_budget))
        .count();
    let failed = results.iter().filter(|r| r.is_err()).count();
    vec![
        String::new(),
        format!(
            "Compressed {} images: {} within budget, {} over budget, {} failed",
            results.len(),
            within,
            over,
            failed
        ),
    ]
}

// ============================================================================
// Upload
// ============================================================================

/// Format a single upload progress event.
///
/// `Started` prints the header; the outcome event prints the context lines
/// beneath it.
pub fn format_upload_event(event: &UploadEvent) -> Vec<String> {
    match event {
        UploadEvent::Started { index, total, name } => {
            vec![format!("[{}/{}] {}", index, total, name)]
        }
        UploadEvent::Uploaded {
            photo,
            original_bytes,
            stored_bytes,
            quality,
            met_budget,
            ..
        } => {
            let mut lines = vec![format!("{}#{} → {}", indent(1), photo.id, photo.url)];
            if original_bytes == stored_bytes {
                lines.push(format!(
                    "{}{}, stored untouched",
                    indent(1),
                    format_bytes(*stored_bytes)
                ));
            } else {
                lines.push(format!(
                    "{}{} → {} at quality {}",
                    indent(1),
                    format_bytes(*original_bytes),
                    format_bytes(*stored_bytes),
                    quality
                ));
            }
            if !met_budget {
                lines.push(format!(
                    "{}Warning: still over the byte budget at the quality floor",
                    indent(1)
                ));
            }
            lines
        }
        UploadEvent::Failed { error, .. } => {
            vec![format!("{}Error: {}", indent(1), error)]
        }
    }
}

pub fn format_upload_summary(report: &UploadReport) -> Vec<String> {
    let mut summary = format!(
        "Uploaded {} of {} photos",
        report.uploaded.len(),
        report.total()
    );
    if !report.failed.is_empty() {
        summary.push_str(&format!(", {} failed", report.failed.len()));
    }
    vec![String::new(), summary]
}

pub fn print_upload_summary(report: &UploadReport) {
    print_lines(format_upload_summary(report));
}

// ============================================================================
// Gallery
// ============================================================================

fn layout_label(layout: LayoutClass) -> &'static str {
    match layout {
        LayoutClass::Wide => "wide",
        LayoutClass::Tall => "tall",
        LayoutClass::Regular => "regular",
    }
}

/// One stored photo: header, then whichever details are set.
pub fn format_photo(photo: &PhotoRecord) -> Vec<String> {
    let mut lines = vec![format!(
        "#{} {} ({}x{}, {})",
        photo.id,
        photo.file_name(),
        photo.width,
        photo.height,
        layout_label(photo.layout())
    )];

    if let Some(caption) = &photo.caption {
        lines.push(format!("{}Caption: {}", indent(1), caption));
    }

    let exposure: Vec<String> = [
        photo
            .date_taken
            .map(|d| d.format("%Y-%m-%d").to_string()),
        photo.shutter_speed.clone(),
        photo.aperture.clone(),
        photo.iso.as_ref().map(|iso| format!("ISO {}", iso)),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !exposure.is_empty() {
        lines.push(format!("{}Taken: {}", indent(1), exposure.join(" · ")));
    }

    lines.push(format!("{}URL: {}", indent(1), photo.url));
    lines
}

/// All photos, newest first as the gateway returns them.
pub fn format_photo_list(photos: &[PhotoRecord]) -> Vec<String> {
    if photos.is_empty() {
        return vec!["No photos yet".to_string()];
    }
    let mut lines: Vec<String> = photos.iter().flat_map(format_photo).collect();
    lines.push(String::new());
    lines.push(match photos.len() {
        1 => "1 photo".to_string(),
        n => format!("{} photos", n),
    });
    lines
}

pub fn print_photo_list(photos: &[PhotoRecord]) {
    print_lines(format_photo_list(photos));
}

pub fn print_photo(photo: &PhotoRecord) {
    print_lines(format_photo(photo));
}

pub fn format_filter(filter: &FilterSettings) -> Vec<String> {
    let mut lines = vec![
        "Filter".to_string(),
        format!("{}Color: {}", indent(1), filter.color),
        format!("{}Opacity: {}%", indent(1), filter.opacity),
        format!("{}Blend: {}", indent(1), filter.blend_mode),
    ];
    match filter.overlay() {
        Ok(overlay) => lines.push(format!("{}Overlay: {}", indent(1), overlay.to_css())),
        Err(e) => lines.push(format!("{}Invalid: {}", indent(1), e)),
    }
    lines
}

pub fn print_filter(filter: &FilterSettings) {
    print_lines(format_filter(filter));
}
