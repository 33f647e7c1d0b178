// File: crates/fibdash-core/tests/render.rs
// Purpose: Render smoke tests plus golden snapshots with a bless flow.
// Behavior:
// - If env UPDATE_SNAPSHOTS=1, (re)writes the snapshot files.
// - Else, if a snapshot exists, compares decoded pixels for an exact match.
// - Else, logs a note and returns without failing to ease first run.
// Golden renders are also checked for size, background and candle colors on every run.

use chrono::NaiveDate;
use fibdash_core::{Chart, OhlcRecord, PriceSeries, RenderOptions, Theme, Trace, ViewState};
use fibdash_core::prepare::simple_moving_average;

fn bless_mode() -> bool {
    std::env::var("UPDATE_SNAPSHOTS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

fn write_or_compare(path: &std::path::Path, bytes: &[u8]) {
    if bless_mode() {
        if let Some(parent) = path.parent() { std::fs::create_dir_all(parent).ok(); }
        std::fs::write(path, bytes).expect("write snapshot");
        eprintln!("[snapshot] Updated {} ({} bytes)", path.display(), bytes.len());
        return;
    }
    if path.exists() {
        let want = std::fs::read(path).expect("read snapshot");
        let got_img = image::load_from_memory(bytes).expect("decode got").to_rgba8();
        let want_img = image::load_from_memory(&want).expect("decode want").to_rgba8();
        assert_eq!(got_img.as_raw(), want_img.as_raw(), "Pixels differ: {}", path.display());
    } else {
        eprintln!("[snapshot] Missing {}; set UPDATE_SNAPSHOTS=1 to bless.", path.display());
    }
}

fn series() -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let rows = [
        (2.0, 3.0, 1.0, 2.5),
        (2.5, 3.5, 2.0, 2.0),
        (2.0, 4.0, 1.5, 3.0),
        (3.0, 3.2, 2.4, 2.6),
        (2.6, 2.9, 2.1, 2.2),
        (2.2, 3.1, 2.0, 3.0),
        (3.0, 3.6, 2.8, 3.4),
    ];
    PriceSeries::new(
        rows.iter()
            .enumerate()
            .map(|(i, &(o, h, l, c))| OhlcRecord::new(start + chrono::Days::new(i as u64), o, h, l, c))
            .collect(),
    )
}

fn chart() -> Chart {
    let s = series();
    let theme = Theme::dark();
    let mut chart = Chart::new("TEST Candlestick Chart with 2-day and 3-day Moving Averages");
    chart.add_trace(Trace::candles(s.records()));
    chart.add_trace(Trace::moving_average(&simple_moving_average(&s, 2), theme.sma[0]));
    chart.add_trace(Trace::moving_average(&simple_moving_average(&s, 3), theme.sma[1]));
    let span = (chart_x(&s, 0), chart_x(&s, s.len() - 1));
    chart.add_trace(Trace::Level {
        name: "Horizontal Line at 2.75".into(),
        color: skia_safe::Color::from_rgb(0x17, 0x7e, 0x89),
        value: 2.75,
        span,
    });
    chart.autoscale();
    chart
}

fn chart_x(s: &PriceSeries, i: usize) -> f64 {
    fibdash_core::series::day_number(s.records()[i].date)
}

#[test]
fn render_smoke_png() {
    let chart = chart();
    let opts = RenderOptions::default();
    let bytes = chart.render_to_png_bytes(&opts).expect("render bytes");
    assert!(bytes.starts_with(&[137, 80, 78, 71]), "should be PNG header");

    let img = image::load_from_memory(&bytes).expect("decode").to_rgba8();
    assert_eq!(img.width() as i32, opts.width);
    assert_eq!(img.height() as i32, opts.height);
    // Background alpha in the top-left corner.
    assert_eq!(img.get_pixel(0, 0)[3], 255);

    let out = std::path::PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("render/smoke.png");
    chart.render_to_png(&opts, &out).expect("render should succeed");
    assert!(std::fs::metadata(&out).expect("output exists").len() > 0);
}

#[test]
fn autoscale_covers_candles_lines_and_levels() {
    let chart = chart();
    let view = ViewState::fit(&chart);
    assert!(view.y_min < 1.0 && view.y_max > 4.0);
    assert!(view.x_min < chart_x(&series(), 0));
    assert!(view.x_max > chart_x(&series(), 6));
    assert_eq!(chart.x_axis.min, view.x_min);
    assert_eq!(chart.y_axis.max, view.y_max);
}

#[test]
fn empty_chart_falls_back_to_unit_view() {
    let view = ViewState::fit(&Chart::new("empty"));
    assert_eq!((view.x_min, view.x_max, view.y_min, view.y_max), (0.0, 1.0, 0.0, 1.0));
}

fn rgb(c: skia_safe::Color) -> [u8; 3] {
    [c.r(), c.g(), c.b()]
}

/// Checks that hold with or without a blessed snapshot.
fn assert_chart_pixels(bytes: &[u8], opts: &RenderOptions) {
    let img = image::load_from_memory(bytes).expect("decode").to_rgba8();
    assert_eq!((img.width() as i32, img.height() as i32), (opts.width, opts.height));

    let theme = &opts.theme;
    let px = |x: u32, y: u32| {
        let p = img.get_pixel(x, y);
        [p[0], p[1], p[2]]
    };
    // Margins outside the plot carry only the background when labels are off.
    assert_eq!(px(0, 0), rgb(theme.background));
    assert_eq!(px(img.width() / 2, 4), rgb(theme.background));

    let count = |color: [u8; 3]| img.pixels().filter(|p| [p[0], p[1], p[2]] == color).count();
    assert!(count(rgb(theme.candle_up)) > 50, "up candle bodies should be drawn");
    assert!(count(rgb(theme.candle_down)) > 50, "down candle bodies should be drawn");
}

#[test]
fn golden_dashboard_chart() {
    let mut opts = RenderOptions::default();
    opts.width = 480;
    opts.height = 320;
    opts.draw_labels = false; // deterministic
    let bytes = chart().render_to_png_bytes(&opts).expect("render bytes");
    assert_chart_pixels(&bytes, &opts);
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/__snapshots__/dashboard_chart.png");
    write_or_compare(&path, &bytes);
}

#[test]
fn golden_dashboard_chart_light() {
    let opts = RenderOptions { width: 480, height: 320, theme: Theme::light(), draw_labels: false, ..RenderOptions::default() };
    let bytes = chart().render_to_png_bytes(&opts).expect("render bytes");
    assert_chart_pixels(&bytes, &opts);
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/__snapshots__/dashboard_chart_light.png");
    write_or_compare(&path, &bytes);
}
