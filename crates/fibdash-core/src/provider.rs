// File: crates/fibdash-core/src/provider.rs
// Summary: Market-data provider boundary plus CSV-directory and in-memory implementations.
// Notes:
// - The CSV reader understands both flat exports (`Date,Open,High,...`) and the
//   multi-row headers newer yfinance versions write (`Price,...` / `Ticker,...` / `Date,...`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::FetchError;
use crate::raw::{Cell, RawColumn, RawFrame};

/// Requested span of history. `end` is exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateRange {
    #[default]
    All,
    Between { start: NaiveDate, end: NaiveDate },
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            DateRange::All => true,
            DateRange::Between { start, end } => date >= start && date < end,
        }
    }

    /// 2020-01-01 up to (excluding) the day before `today`.
    pub fn default_between(today: NaiveDate) -> Self {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN);
        let end = today.pred_opt().unwrap_or(today);
        DateRange::Between { start, end }
    }
}

pub trait MarketDataProvider {
    fn fetch(&self, ticker: &str, range: &DateRange) -> Result<RawFrame, FetchError>;
}

/// Reads `<root>/<TICKER>.csv` files.
#[derive(Clone, Debug)]
pub struct CsvDirectoryProvider {
    root: PathBuf,
}

impl CsvDirectoryProvider {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    fn resolve(&self, ticker: &str) -> Result<PathBuf, FetchError> {
        let upper = ticker.trim().to_uppercase();
        [upper.as_str(), ticker.trim()]
            .iter()
            .map(|name| self.root.join(format!("{name}.csv")))
            .find(|p| p.exists())
            .ok_or_else(|| FetchError::NotFound { ticker: ticker.to_string(), root: self.root.clone() })
    }
}

impl MarketDataProvider for CsvDirectoryProvider {
    fn fetch(&self, ticker: &str, range: &DateRange) -> Result<RawFrame, FetchError> {
        let path = self.resolve(ticker)?;
        debug!(path = %path.display(), "loading price CSV");
        let mut frame = load_raw_csv(&path)?;
        frame.retain_rows(|d| range.contains(d));
        if frame.is_empty() {
            return Err(FetchError::Empty { ticker: ticker.to_string() });
        }
        Ok(frame)
    }
}

/// Fixed frames keyed by upper-cased ticker.
#[derive(Clone, Debug, Default)]
pub struct InMemoryProvider {
    frames: HashMap<String, RawFrame>,
}

impl InMemoryProvider {
    pub fn new() -> Self { Self::default() }

    pub fn with_frame(mut self, ticker: &str, frame: RawFrame) -> Self {
        self.frames.insert(ticker.trim().to_uppercase(), frame);
        self
    }
}

impl MarketDataProvider for InMemoryProvider {
    fn fetch(&self, ticker: &str, range: &DateRange) -> Result<RawFrame, FetchError> {
        let mut frame = self
            .frames
            .get(&ticker.trim().to_uppercase())
            .cloned()
            .ok_or_else(|| FetchError::NotFound { ticker: ticker.to_string(), root: PathBuf::from("<memory>") })?;
        frame.retain_rows(|d| range.contains(d));
        if frame.is_empty() {
            return Err(FetchError::Empty { ticker: ticker.to_string() });
        }
        Ok(frame)
    }
}

/// Load a CSV export into a raw frame without interpreting price cells.
pub fn load_raw_csv(path: &Path) -> Result<RawFrame, FetchError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = rdr.records();
    let Some(first) = rows.next() else {
        return Ok(RawFrame::default());
    };
    let first = first?;
    let width = first.len();
    let mut headers: Vec<Vec<String>> = first.iter().map(|h| vec![h.trim().to_string()]).collect();

    let index_col = headers
        .iter()
        .position(|h| matches!(h[0].to_lowercase().as_str(), "date" | "datetime" | "timestamp"))
        .unwrap_or(0);

    let mut index = Vec::new();
    let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); width];

    for rec in rows {
        let rec = rec?;
        let raw_date = rec.get(index_col).unwrap_or("");
        match parse_date(raw_date) {
            Some(date) => {
                index.push(date);
                for (c, col) in cells.iter_mut().enumerate() {
                    col.push(rec.get(c).map(Cell::parse).unwrap_or(Cell::Missing));
                }
            }
            // Extra header levels only appear before the first data row.
            None if index.is_empty() => {
                for (c, h) in headers.iter_mut().enumerate() {
                    h.push(rec.get(c).unwrap_or("").trim().to_string());
                }
            }
            None => {
                let line = rec.position().map(|p| p.line()).unwrap_or(0);
                return Err(FetchError::Malformed { line, value: raw_date.to_string() });
            }
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .enumerate()
        .filter(|(c, _)| *c != index_col)
        .map(|(_, (header, cells))| RawColumn::with_levels(header, cells))
        .collect();
    debug!(rows = index.len(), path = %path.display(), "parsed price CSV");
    Ok(RawFrame { index, columns })
}

/// Accepts `YYYY-MM-DD`, compact `YYYYMMDD`, `YYYY-MM-DD HH:MM:SS` with an optional
/// UTC offset, and epoch seconds or milliseconds.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(s, "%Y%m%d").ok();
    }
    if let Ok(n) = s.parse::<i64>() {
        // Plain integers shorter than an epoch timestamp are not dates.
        let secs = if n > 10_i64.pow(12) { n / 1000 } else if n > 10_i64.pow(8) { n } else { return None };
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}
