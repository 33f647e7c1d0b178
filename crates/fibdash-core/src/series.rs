// File: crates/fibdash-core/src/series.rs
// Summary: Cleaned price series model (OHLC records) and date-aligned moving-average series.
// Notes:
// - `low <= open,close <= high` is what providers usually deliver, but nothing here
//   enforces it; downstream code must tolerate inverted candles.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// One period of cleaned price data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OhlcRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl OhlcRecord {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self { date, open, high, low, close }
    }
}

/// Ordered sequence of records, in the order the provider delivered them.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    records: Vec<OhlcRecord>,
}

impl PriceSeries {
    pub fn new(records: Vec<OhlcRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[OhlcRecord] { &self.records }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
    pub fn first(&self) -> Option<&OhlcRecord> { self.records.first() }
    pub fn last(&self) -> Option<&OhlcRecord> { self.records.last() }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(|r| r.close)
    }

    /// Trailing slice of at most `n` records.
    pub fn tail(&self, n: usize) -> &[OhlcRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }
}

/// Moving-average values aligned 1:1 with the `PriceSeries` they were computed from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovingAverageSeries {
    pub window: usize,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

impl MovingAverageSeries {
    pub fn len(&self) -> usize { self.points.len() }
    pub fn is_empty(&self) -> bool { self.points.is_empty() }

    /// Value at index `i`; `None` both for undefined head points and out-of-range indices.
    pub fn value_at(&self, i: usize) -> Option<f64> {
        self.points.get(i).and_then(|&(_, v)| v)
    }

    /// Only the points that carry a value, in order.
    pub fn defined(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points.iter().filter_map(|&(d, v)| v.map(|v| (d, v)))
    }

    /// Display name used for chart legends.
    pub fn name(&self) -> String {
        format!("{}-day SMA", self.window)
    }
}

/// Map a calendar date onto the chart's X coordinate (days since the common era).
pub fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Inverse of [`day_number`]; fractional days are truncated.
pub fn date_from_day_number(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() || x < i32::MIN as f64 || x > i32::MAX as f64 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.floor() as i32)
}
