// File: crates/fibdash-core/src/lib.rs
// Summary: Core library entry point; price-series preparation, Fibonacci levels, annotations,
//          market-data providers and chart rendering.

pub mod annotation;
pub mod axis;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fibonacci;
pub mod layout;
pub mod prepare;
pub mod provider;
pub mod raw;
pub mod series;
pub mod theme;
pub mod view;

pub use annotation::{build_markers, HorizontalMarker, DEFAULT_PALETTE};
pub use axis::{Axis, AxisKind};
pub use chart::{Candle, Chart, RenderOptions, Trace};
pub use config::DashboardConfig;
pub use dashboard::{
    build_chart_section, run_chart_section, run_fibonacci_section, run_session, ChartSection, ChartSink,
    PngFileSink, SessionReport,
};
pub use error::{DashboardError, FetchError, Notice};
pub use fibonacci::{compute, Action, FibLevel, FibMethod, FibonacciEntry, FibonacciInput, FibonacciLevelSet, LevelKind, SwingRange};
pub use prepare::{prepare, simple_moving_average, PrepareReport, Prepared, SmaWindows};
pub use provider::{CsvDirectoryProvider, DateRange, InMemoryProvider, MarketDataProvider};
pub use raw::{Cell, RawColumn, RawFrame};
pub use series::{MovingAverageSeries, OhlcRecord, PriceSeries};
pub use theme::Theme;
pub use view::ViewState;
