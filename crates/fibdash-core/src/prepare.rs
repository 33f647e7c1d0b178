// File: crates/fibdash-core/src/prepare.rs
// Summary: Cleans a raw provider frame into a numeric price series and computes two SMAs over closes.

use tracing::{debug, warn};

use crate::error::{DashboardError, Notice};
use crate::raw::{Cell, RawFrame};
use crate::series::{MovingAverageSeries, OhlcRecord, PriceSeries};

/// Price fields every usable frame must carry, in record order.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Open", "High", "Low", "Close"];

/// The two user-chosen moving-average windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SmaWindows {
    pub first: usize,
    pub second: usize,
}

impl SmaWindows {
    pub const fn new(first: usize, second: usize) -> Self {
        Self { first, second }
    }

    pub fn largest(&self) -> usize { self.first.max(self.second) }

    pub fn validate(&self) -> Result<(), DashboardError> {
        for w in [self.first, self.second] {
            if w == 0 {
                return Err(DashboardError::InvalidWindow(w));
            }
        }
        Ok(())
    }
}

impl Default for SmaWindows {
    fn default() -> Self { Self::new(20, 50) }
}

/// What the cleaning pass did, for display next to the chart.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrepareReport {
    pub input_rows: usize,
    pub dropped_rows: usize,
    pub notices: Vec<Notice>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Prepared {
    pub series: PriceSeries,
    pub sma1: MovingAverageSeries,
    pub sma2: MovingAverageSeries,
    pub report: PrepareReport,
}

/// Clean `raw` and compute both moving averages.
///
/// Rows with a missing or non-numeric price in any required column are dropped; the
/// remaining rows keep their original order. Fails when a required column is absent,
/// when nothing survives cleaning, or when fewer rows remain than the larger window.
pub fn prepare(raw: &RawFrame, windows: SmaWindows) -> Result<Prepared, DashboardError> {
    windows.validate()?;

    let missing: Vec<&'static str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| raw.column(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(DashboardError::MissingColumns(missing));
    }

    let mut notices = Vec::new();
    let mut numeric: Vec<Vec<Option<f64>>> = Vec::with_capacity(REQUIRED_COLUMNS.len());
    for name in REQUIRED_COLUMNS {
        let Some(col) = raw.column(name) else {
            return Err(DashboardError::MissingColumns(vec![name]));
        };
        let values: Vec<Option<f64>> = (0..raw.len())
            .map(|i| col.cells.get(i).unwrap_or(&Cell::Missing).to_number())
            .collect();
        if col.cells.iter().any(Cell::is_text) {
            let missing = values.iter().filter(|v| v.is_none()).count();
            debug!(column = name, missing, "coerced non-numeric column");
            notices.push(Notice::CoercedColumn { column: name, missing });
        }
        numeric.push(values);
    }

    let records: Vec<OhlcRecord> = raw
        .index
        .iter()
        .enumerate()
        .filter_map(|(i, &date)| {
            Some(OhlcRecord::new(date, numeric[0][i]?, numeric[1][i]?, numeric[2][i]?, numeric[3][i]?))
        })
        .collect();

    let dropped = raw.len() - records.len();
    if dropped > 0 {
        warn!(dropped, "dropped rows with missing prices");
        notices.push(Notice::DroppedRows { count: dropped });
    }

    let series = PriceSeries::new(records);
    let required = windows.largest();
    if series.is_empty() || series.len() < required {
        return Err(DashboardError::InsufficientData { rows: series.len(), required });
    }

    let sma1 = simple_moving_average(&series, windows.first);
    let sma2 = simple_moving_average(&series, windows.second);
    debug!(rows = series.len(), w1 = windows.first, w2 = windows.second, "prepared price series");

    Ok(Prepared {
        series,
        sma1,
        sma2,
        report: PrepareReport { input_rows: raw.len(), dropped_rows: dropped, notices },
    })
}

/// Trailing mean of closes; the first `window - 1` points are undefined.
/// A zero window yields an all-undefined series.
///
/// Each mean is summed over its own window so one outlier close cannot skew later values.
pub fn simple_moving_average(series: &PriceSeries, window: usize) -> MovingAverageSeries {
    let records = series.records();
    let points = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let value = (window > 0 && i + 1 >= window).then(|| {
                let sum: f64 = records[i + 1 - window..=i].iter().map(|w| w.close).sum();
                sum / window as f64
            });
            (r.date, value)
        })
        .collect();
    MovingAverageSeries { window, points }
}
