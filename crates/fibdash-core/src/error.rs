// File: crates/fibdash-core/src/error.rs
// Summary: Error taxonomy for the dashboard sections and the recoverable notices reported beside results.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the market-data provider boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no data file for ticker {ticker} (looked in {})", .root.display())]
    NotFound { ticker: String, root: PathBuf },
    #[error("reading price data: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing price data: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed price data at line {line}: {value:?} is not a date")]
    Malformed { line: u64, value: String },
    #[error("provider returned no rows for {ticker}")]
    Empty { ticker: String },
}

/// Errors surfaced to the user instead of a chart or a level table.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] FetchError),
    #[error("data does not contain the necessary columns (missing {})", .0.join(", "))]
    MissingColumns(Vec<&'static str>),
    #[error("no usable data: {rows} rows after cleaning, at least {required} needed")]
    InsufficientData { rows: usize, required: usize },
    #[error("moving-average window must be at least 1 (got {0})")]
    InvalidWindow(usize),
    #[error("high and low prices must both be positive (high={high}, low={low})")]
    InsufficientInput { high: f64, low: f64 },
    #[error("chart rendering failed: {reason}")]
    Render { reason: String },
}

impl DashboardError {
    /// True for the "nothing to draw" family of errors.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            DashboardError::DataUnavailable(_)
                | DashboardError::MissingColumns(_)
                | DashboardError::InsufficientData { .. }
        )
    }
}

/// Conditions that were recovered locally but should still be shown.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    CoercedColumn { column: &'static str, missing: usize },
    DroppedRows { count: usize },
    InvalidLineValues { input: String },
    MismatchedAnnotationInputs { values: usize, colors: usize },
}

impl Notice {
    pub fn is_warning(&self) -> bool {
        !matches!(self, Notice::CoercedColumn { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::CoercedColumn { column, missing } => write!(
                f,
                "column {column} contained non-numeric values; {missing} missing after conversion"
            ),
            Notice::DroppedRows { count } => write!(f, "dropped {count} rows with missing prices"),
            Notice::InvalidLineValues { input } => write!(
                f,
                "invalid horizontal line values {input:?}; enter numbers separated by commas"
            ),
            Notice::MismatchedAnnotationInputs { values, colors } => write!(
                f,
                "{colors} colors for {values} lines; filling from the default palette"
            ),
        }
    }
}
