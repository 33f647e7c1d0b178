// File: crates/fibdash-core/tests/dashboard.rs
// Purpose: Validate session orchestration: sink is only invoked for usable data, and the
//          Fibonacci section survives chart failures.

use chrono::NaiveDate;
use fibdash_core::fibonacci::{Action, FibMethod};
use fibdash_core::raw::{Cell, RawColumn, RawFrame};
use fibdash_core::{
    build_chart_section, run_chart_section, run_session, Chart, ChartSink, DashboardConfig, DashboardError,
    FibonacciEntry, FibonacciInput, InMemoryProvider, Notice, SwingRange, Theme, Trace,
};

#[derive(Default)]
struct RecordingSink {
    titles: Vec<String>,
    traces: Vec<usize>,
    fail: bool,
}

impl ChartSink for RecordingSink {
    fn present(&mut self, chart: &Chart) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("display went away");
        }
        self.titles.push(chart.title.clone());
        self.traces.push(chart.traces.len());
        Ok(())
    }
}

fn frame(n: u32, bad_close: &[usize]) -> RawFrame {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let index: Vec<NaiveDate> = (0..n).map(|i| start + chrono::Days::new(i as u64)).collect();
    let price = |i: u32, off: f64| 100.0 + (i as f64 * 0.7).sin() * 5.0 + off;
    let col = |name: &str, off: f64| RawColumn::new(name, (0..n).map(|i| Cell::Number(price(i, off))).collect());
    let mut close = col("Close", 0.0);
    for &i in bad_close {
        close.cells[i] = Cell::from("--");
    }
    RawFrame::new(index)
        .with_column(col("Open", -0.3))
        .with_column(col("High", 2.0))
        .with_column(col("Low", -2.0))
        .with_column(close)
}

fn provider(frame: RawFrame) -> InMemoryProvider {
    InMemoryProvider::new().with_frame("AAPL", frame)
}

#[test]
fn chart_section_presents_once_with_all_traces() {
    let provider = provider(frame(30, &[4]));
    let cfg = DashboardConfig::new("aapl").with_windows(5, 10).with_lines("101, 99", "red");
    let mut sink = RecordingSink::default();

    let section = run_chart_section(&provider, &cfg, &Theme::dark(), &mut sink).expect("chart section");
    assert_eq!(sink.titles, vec!["AAPL Candlestick Chart with 5-day and 10-day Moving Averages".to_string()]);
    // candles + two SMAs + two levels
    assert_eq!(sink.traces, vec![5]);
    assert_eq!(section.prepared.series.len(), 29);
    assert!(section.notices.contains(&Notice::DroppedRows { count: 1 }));
    assert!(section.notices.contains(&Notice::MismatchedAnnotationInputs { values: 2, colors: 1 }));
}

#[test]
fn empty_cleaned_series_reports_insufficient_data_without_chart() {
    let all_bad: Vec<usize> = (0..8).collect();
    let provider = provider(frame(8, &all_bad));
    let cfg = DashboardConfig::new("AAPL").with_windows(2, 3);
    let mut sink = RecordingSink::default();

    let err = run_chart_section(&provider, &cfg, &Theme::dark(), &mut sink).unwrap_err();
    assert!(matches!(err, DashboardError::InsufficientData { rows: 0, .. }));
    assert!(sink.titles.is_empty(), "no chart may be requested");
}

#[test]
fn unknown_ticker_is_data_unavailable() {
    let provider = provider(frame(10, &[]));
    let cfg = DashboardConfig::new("MSFT").with_windows(2, 3);
    let err = build_chart_section(&provider, &cfg).unwrap_err();
    assert!(matches!(err, DashboardError::DataUnavailable(_)));
}

#[test]
fn sink_failure_maps_to_render_error() {
    let provider = provider(frame(10, &[]));
    let cfg = DashboardConfig::new("AAPL").with_windows(2, 3);
    let mut sink = RecordingSink { fail: true, ..Default::default() };
    let err = run_chart_section(&provider, &cfg, &Theme::light(), &mut sink).unwrap_err();
    match err {
        DashboardError::Render { reason } => assert!(reason.contains("display went away")),
        other => panic!("expected Render, got {other:?}"),
    }
}

#[test]
fn fibonacci_section_survives_chart_failure() {
    let provider = InMemoryProvider::new();
    let cfg = DashboardConfig::new("AAPL");
    let mut sink = RecordingSink::default();
    let input = FibonacciInput::new(100.0, 50.0, 75.0)
        .with_action(Action::Buy)
        .with_method(FibMethod::ProjectionExpansion);

    let entry = FibonacciEntry::from(input);
    let report = run_session(&provider, &cfg, &Theme::dark(), &mut sink, Some(&entry));
    assert!(report.chart.is_err());
    let levels = report.fibonacci.expect("requested").expect("computed");
    assert!((levels.get("PP 100%").unwrap() - 25.0).abs() < 1e-9);
    assert!(sink.titles.is_empty());
}

#[test]
fn chart_axes_cover_markers_and_span_series_dates() {
    let provider = provider(frame(20, &[]));
    let cfg = DashboardConfig::new("AAPL").with_windows(3, 4).with_lines("150", "#abc");
    let section = build_chart_section(&provider, &cfg).unwrap();
    let chart = section.to_chart(&Theme::dark());

    assert!(chart.y_axis.max >= 150.0);
    let level = chart.traces.iter().find_map(|t| match t {
        Trace::Level { span, value, .. } => Some((*span, *value)),
        _ => None,
    });
    let (span, value) = level.expect("level trace");
    assert_eq!(value, 150.0);
    assert!(span.0 < span.1);
    assert!(chart.x_axis.min <= span.0 && chart.x_axis.max >= span.1);

    let sma_points = chart.traces.iter().find_map(|t| match t {
        Trace::Line { name, points, .. } if name == "4-day SMA" => Some(points.len()),
        _ => None,
    });
    assert_eq!(sma_points, Some(17));
}

#[test]
fn session_derives_blank_fibonacci_prices_from_charted_series() {
    let provider = provider(frame(30, &[]));
    let cfg = DashboardConfig::new("AAPL").with_windows(5, 10);
    let mut sink = RecordingSink::default();
    let entry = FibonacciEntry {
        high: None,
        low: None,
        pivot: None,
        action: Action::Sell,
        method: FibMethod::Retracement,
        lookback: Some(10),
    };

    let report = run_session(&provider, &cfg, &Theme::dark(), &mut sink, Some(&entry));
    let section = report.chart.expect("chart section");
    let swing = SwingRange::from_series(&section.prepared.series, Some(10)).unwrap();
    let levels = report.fibonacci.expect("requested").expect("computed");
    let expected = swing.high - (swing.high - swing.low) * 0.5;
    assert!((levels.get("50%").unwrap() - expected).abs() < 1e-9);
}

#[test]
fn explicit_prices_win_over_derived_swing() {
    let provider = provider(frame(30, &[]));
    let cfg = DashboardConfig::new("AAPL").with_windows(5, 10);
    let mut sink = RecordingSink::default();
    let entry = FibonacciEntry {
        high: Some(200.0),
        low: None,
        pivot: None,
        action: Action::Buy,
        method: FibMethod::Retracement,
        lookback: None,
    };

    let report = run_session(&provider, &cfg, &Theme::dark(), &mut sink, Some(&entry));
    let input = entry.resolve(Some(&report.chart.as_ref().unwrap().prepared.series));
    assert_eq!(input.high, 200.0);
    assert!(input.low > 0.0 && input.low < 200.0);
    assert!(report.fibonacci.unwrap().is_ok());
}

#[test]
fn blank_prices_without_series_hit_the_input_guard() {
    let provider = InMemoryProvider::new();
    let cfg = DashboardConfig::new("AAPL");
    let mut sink = RecordingSink::default();
    let entry = FibonacciEntry { high: None, ..FibonacciEntry::from(FibonacciInput::new(100.0, 50.0, 75.0)) };

    let report = run_session(&provider, &cfg, &Theme::dark(), &mut sink, Some(&entry));
    assert!(report.chart.is_err());
    assert!(matches!(
        report.fibonacci,
        Some(Err(DashboardError::InsufficientInput { high, .. })) if high == 0.0
    ));
}
