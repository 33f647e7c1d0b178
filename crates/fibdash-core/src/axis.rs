// File: crates/fibdash-core/src/axis.rs
// Summary: Axis model with title, range, and tick generation for date and price axes.

use crate::series::date_from_day_number;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisKind {
    /// Values are day numbers (see `series::day_number`).
    Date,
    Price,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub kind: AxisKind,
}

impl Axis {
    pub fn new(label: impl Into<String>, min: f64, max: f64, kind: AxisKind) -> Self {
        Self { label: label.into(), min, max, kind }
    }

    pub fn dates() -> Self {
        Self::new("Date", 0.0, 1.0, AxisKind::Date)
    }

    pub fn prices() -> Self {
        Self::new("Price (USD)", 0.0, 100.0, AxisKind::Price)
    }

    /// `count` evenly spaced ticks across the range with their labels.
    pub fn ticks(&self, count: usize) -> Vec<(f64, String)> {
        linspace(self.min, self.max, count)
            .into_iter()
            .map(|v| (v, self.format(v)))
            .collect()
    }

    pub fn format(&self, v: f64) -> String {
        match self.kind {
            AxisKind::Date => date_from_day_number(v.round())
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            AxisKind::Price => format!("{v:.2}"),
        }
    }
}

pub fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    if steps < 2 { return vec![start, end]; }
    let step = (end - start) / (steps as f64 - 1.0);
    (0..steps).map(|i| start + step * i as f64).collect()
}
