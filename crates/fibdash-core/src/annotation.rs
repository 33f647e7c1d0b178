// File: crates/fibdash-core/src/annotation.rs
// Summary: User-defined horizontal reference lines: parsing of comma-separated inputs and palette cycling.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::error::Notice;

/// Colors assigned, by line index, to lines without a user color.
pub const DEFAULT_PALETTE: [&str; 5] = ["#177e89", "#084c61", "#db3a34", "#ffc857", "#323031"];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HorizontalMarker {
    pub value: f64,
    pub color: String,
    pub label: String,
}

impl HorizontalMarker {
    pub fn new(value: f64, color: impl Into<String>) -> Self {
        Self { value, color: color.into(), label: format!("Horizontal Line at {value:?}") }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("{entry:?} is not a finite number")]
pub struct LineValueError {
    pub entry: String,
}

/// Parse `"101.5, 99"` into values. Empty input means no lines; one bad or non-finite
/// entry rejects all.
pub fn parse_line_values(input: &str) -> Result<Vec<f64>, LineValueError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    input
        .split(',')
        .map(|v| {
            let entry = v.trim();
            entry
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .ok_or_else(|| LineValueError { entry: entry.to_string() })
        })
        .collect()
}

pub fn parse_colors(input: &str) -> Vec<String> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    input.split(',').map(|c| c.trim().to_string()).collect()
}

/// Pair line values with colors.
///
/// When the counts differ, line `i` without a user color takes
/// `DEFAULT_PALETTE[i % 5]` and surplus colors are ignored.
pub fn build_markers(values_input: &str, colors_input: &str) -> (Vec<HorizontalMarker>, Vec<Notice>) {
    let mut notices = Vec::new();
    let values = match parse_line_values(values_input) {
        Ok(v) => v,
        Err(e) => {
            warn!(input = values_input, error = %e, "rejecting horizontal line values");
            notices.push(Notice::InvalidLineValues { input: values_input.to_string() });
            Vec::new()
        }
    };
    let colors = parse_colors(colors_input);

    if colors.len() != values.len() {
        warn!(values = values.len(), colors = colors.len(), "line/color count mismatch");
        notices.push(Notice::MismatchedAnnotationInputs { values: values.len(), colors: colors.len() });
    }

    let markers = values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let color = colors
                .get(i)
                .cloned()
                .unwrap_or_else(|| DEFAULT_PALETTE[i % DEFAULT_PALETTE.len()].to_string());
            HorizontalMarker::new(value, color)
        })
        .collect();
    (markers, notices)
}
