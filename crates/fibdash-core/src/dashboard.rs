// File: crates/fibdash-core/src/dashboard.rs
// Summary: One interaction end to end: fetch, prepare, annotate, and hand the chart to a sink;
//          the Fibonacci section runs independently of the chart outcome.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::annotation::{build_markers, HorizontalMarker, DEFAULT_PALETTE};
use crate::chart::{Chart, RenderOptions, Trace};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Notice};
use crate::fibonacci::{FibonacciEntry, FibonacciInput, FibonacciLevelSet};
use crate::prepare::{prepare, Prepared};
use crate::provider::MarketDataProvider;
use crate::series::day_number;
use crate::theme::{parse_color, Theme};

/// Where a finished chart goes (file, window, test recorder).
pub trait ChartSink {
    fn present(&mut self, chart: &Chart) -> anyhow::Result<()>;
}

/// Writes the chart as a PNG file.
pub struct PngFileSink {
    pub path: PathBuf,
    pub options: RenderOptions,
}

impl PngFileSink {
    pub fn new(path: impl Into<PathBuf>, options: RenderOptions) -> Self {
        Self { path: path.into(), options }
    }
}

impl ChartSink for PngFileSink {
    fn present(&mut self, chart: &Chart) -> anyhow::Result<()> {
        chart.render_to_png(&self.options, &self.path)
    }
}

/// Cleaned data, annotations and notices for one chart.
#[derive(Clone, Debug)]
pub struct ChartSection {
    pub ticker: String,
    pub prepared: Prepared,
    pub markers: Vec<HorizontalMarker>,
    pub notices: Vec<Notice>,
}

impl ChartSection {
    pub fn title(&self) -> String {
        format!(
            "{} Candlestick Chart with {}-day and {}-day Moving Averages",
            self.ticker, self.prepared.sma1.window, self.prepared.sma2.window
        )
    }

    /// Candles, both SMAs and the horizontal markers, autoscaled.
    pub fn to_chart(&self, theme: &Theme) -> Chart {
        let series = &self.prepared.series;
        let mut chart = Chart::new(self.title());
        chart.add_trace(Trace::candles(series.records()));
        chart.add_trace(Trace::moving_average(&self.prepared.sma1, theme.sma[0]));
        chart.add_trace(Trace::moving_average(&self.prepared.sma2, theme.sma[1]));

        let span = match (series.first(), series.last()) {
            (Some(a), Some(b)) => (day_number(a.date), day_number(b.date)),
            _ => (0.0, 1.0),
        };
        for (i, m) in self.markers.iter().enumerate() {
            let color = parse_color(&m.color).unwrap_or_else(|| {
                let fallback = DEFAULT_PALETTE[i % DEFAULT_PALETTE.len()];
                warn!(color = %m.color, fallback, "unrecognised line color");
                parse_color(fallback).unwrap_or(theme.axis_line)
            });
            chart.add_trace(Trace::Level { name: m.label.clone(), color, value: m.value, span });
        }
        chart.autoscale();
        chart
    }
}

/// Fetch, clean and annotate. Nothing is rendered here.
pub fn build_chart_section(
    provider: &dyn MarketDataProvider,
    cfg: &DashboardConfig,
) -> Result<ChartSection, DashboardError> {
    let ticker = cfg.display_ticker();
    let raw = provider.fetch(&ticker, &cfg.range)?;
    let prepared = prepare(&raw, cfg.windows)?;
    let (markers, marker_notices) = build_markers(&cfg.line_values, &cfg.line_colors);

    let mut notices = prepared.report.notices.clone();
    notices.extend(marker_notices);
    info!(ticker = %ticker, rows = prepared.series.len(), markers = markers.len(), "chart section ready");
    Ok(ChartSection { ticker, prepared, markers, notices })
}

/// Build the section and present it. The sink is only called when the section built.
pub fn run_chart_section(
    provider: &dyn MarketDataProvider,
    cfg: &DashboardConfig,
    theme: &Theme,
    sink: &mut dyn ChartSink,
) -> Result<ChartSection, DashboardError> {
    let section = build_chart_section(provider, cfg)?;
    let chart = section.to_chart(theme);
    sink.present(&chart)
        .map_err(|e| DashboardError::Render { reason: format!("{e:#}") })?;
    Ok(section)
}

pub fn run_fibonacci_section(input: &FibonacciInput) -> Result<FibonacciLevelSet, DashboardError> {
    let levels = input.levels()?;
    info!(method = %input.method, action = %input.action, levels = levels.len(), "fibonacci levels computed");
    Ok(levels)
}

/// Outcome of both sections of one interaction.
#[derive(Debug)]
pub struct SessionReport {
    pub chart: Result<ChartSection, DashboardError>,
    pub fibonacci: Option<Result<FibonacciLevelSet, DashboardError>>,
}

/// Run the chart section and, when an entry was given, the Fibonacci section.
/// Blank Fibonacci prices are derived from the charted series when it built.
/// A chart failure never prevents the Fibonacci result.
pub fn run_session(
    provider: &dyn MarketDataProvider,
    cfg: &DashboardConfig,
    theme: &Theme,
    sink: &mut dyn ChartSink,
    fibonacci: Option<&FibonacciEntry>,
) -> SessionReport {
    let chart = run_chart_section(provider, cfg, theme, sink);
    if let Err(e) = &chart {
        warn!(error = %e, "chart section failed");
    }
    let series = chart.as_ref().ok().map(|section| &section.prepared.series);
    let fibonacci = fibonacci.map(|entry| run_fibonacci_section(&entry.resolve(series)));
    SessionReport { chart, fibonacci }
}
