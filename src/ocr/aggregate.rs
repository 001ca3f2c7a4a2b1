//! Aggregation of raw OCR regions into the final text artifact
//!
//! The engine emits zero or more regions in its own order; aggregation
//! joins their texts with single newlines and reduces their confidences
//! to one percentage. No region is dropped or reordered.

use crate::model::OcrRegion;

/// Joins region texts, in the order given, with a single newline between
/// consecutive regions. Regions with empty text still contribute a line.
pub fn assemble_text(regions: &[OcrRegion]) -> String {
    regions
        .iter()
        .map(|region| region.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Arithmetic mean of region confidences as a percentage (0-100), rounded
/// to two decimals. Zero regions yield 0, never NaN.
pub fn mean_confidence(regions: &[OcrRegion]) -> f64 {
    if regions.is_empty() {
        return 0.0;
    }
    let sum: f64 = regions.iter().map(|r| f64::from(r.confidence)).sum();
    round2(sum / regions.len() as f64 * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
