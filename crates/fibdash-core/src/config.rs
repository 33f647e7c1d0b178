// File: crates/fibdash-core/src/config.rs
// Summary: Immutable per-interaction configuration for the chart section.

use crate::prepare::SmaWindows;
use crate::provider::DateRange;

pub const DEFAULT_TICKER: &str = "AAPL";
/// Environment variable naming the CSV data directory.
pub const DATA_DIR_ENV: &str = "FIBDASH_DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "data";

/// Everything the chart section needs; built once from user input and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardConfig {
    pub ticker: String,
    pub range: DateRange,
    pub windows: SmaWindows,
    /// Comma-separated horizontal line values, as typed.
    pub line_values: String,
    /// Comma-separated colors for those lines, as typed.
    pub line_colors: String,
}

impl DashboardConfig {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            range: DateRange::All,
            windows: SmaWindows::default(),
            line_values: String::new(),
            line_colors: String::new(),
        }
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_windows(mut self, first: usize, second: usize) -> Self {
        self.windows = SmaWindows::new(first, second);
        self
    }

    pub fn with_lines(mut self, values: impl Into<String>, colors: impl Into<String>) -> Self {
        self.line_values = values.into();
        self.line_colors = colors.into();
        self
    }

    /// Upper-cased ticker used in titles.
    pub fn display_ticker(&self) -> String {
        self.ticker.trim().to_uppercase()
    }
}

impl Default for DashboardConfig {
    fn default() -> Self { Self::new(DEFAULT_TICKER) }
}
