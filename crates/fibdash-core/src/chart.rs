// File: crates/fibdash-core/src/chart.rs
// Summary: Chart model (candles, moving-average lines, horizontal levels) and headless PNG rendering
//          using Skia CPU raster surfaces.

use anyhow::Result;
use skia_safe as skia;

use crate::axis::Axis;
use crate::layout::{Insets, PlotRect, HEIGHT, WIDTH};
use crate::series::{day_number, MovingAverageSeries, OhlcRecord};
use crate::theme::Theme;
use crate::view::ViewState;

pub struct RenderOptions {
    pub width: i32,
    pub height: i32,
    pub insets: Insets,
    pub theme: Theme,
    /// Text (title, ticks, legend) varies across platforms' fonts; snapshots turn it off.
    pub draw_labels: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            insets: Insets::default(),
            theme: Theme::dark(),
            draw_labels: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candle {
    pub t: f64, // day number (displayed on X)
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
}

impl From<&OhlcRecord> for Candle {
    fn from(r: &OhlcRecord) -> Self {
        Self { t: day_number(r.date), o: r.open, h: r.high, l: r.low, c: r.close }
    }
}

#[derive(Clone, Debug)]
pub enum Trace {
    Candlestick(Vec<Candle>),
    Line { name: String, color: skia::Color, points: Vec<(f64, f64)> },
    /// Dashed horizontal line at `value`, drawn from `span.0` to `span.1` on X.
    Level { name: String, color: skia::Color, value: f64, span: (f64, f64) },
}

impl Trace {
    pub fn candles<'a>(records: impl IntoIterator<Item = &'a OhlcRecord>) -> Self {
        Trace::Candlestick(records.into_iter().map(Candle::from).collect())
    }

    /// Line through the defined points of a moving average.
    pub fn moving_average(ma: &MovingAverageSeries, color: skia::Color) -> Self {
        Trace::Line {
            name: ma.name(),
            color,
            points: ma.defined().map(|(d, v)| (day_number(d), v)).collect(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Trace::Candlestick(_) => None,
            Trace::Line { name, .. } | Trace::Level { name, .. } => Some(name),
        }
    }
}

pub struct Chart {
    pub title: String,
    pub traces: Vec<Trace>,
    pub x_axis: Axis,
    pub y_axis: Axis,
}

impl Default for Chart {
    fn default() -> Self { Self::new("") }
}

impl Chart {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            traces: Vec::new(),
            x_axis: Axis::dates(),
            y_axis: Axis::prices(),
        }
    }

    pub fn add_trace(&mut self, trace: Trace) {
        self.traces.push(trace);
    }

    /// Fit both axes to the data currently in the chart.
    pub fn autoscale(&mut self) {
        ViewState::fit(self).apply_to_chart(self);
    }

    /// Render the chart to a PNG at `output_png_path` using a CPU raster surface.
    pub fn render_to_png(&self, opts: &RenderOptions, output_png_path: impl AsRef<std::path::Path>) -> Result<()> {
        let bytes = self.render_to_png_bytes(opts)?;
        if let Some(parent) = output_png_path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(output_png_path, bytes)?;
        Ok(())
    }

    pub fn render_to_png_bytes(&self, opts: &RenderOptions) -> Result<Vec<u8>> {
        let mut surface = skia::surfaces::raster_n32_premul((opts.width, opts.height))
            .ok_or_else(|| anyhow::anyhow!("failed to create {}x{} raster surface", opts.width, opts.height))?;
        let canvas = surface.canvas();
        let theme = &opts.theme;
        canvas.clear(theme.background);

        let plot = PlotRect::new(opts.width, opts.height, &opts.insets);

        draw_grid(canvas, &plot, theme);
        draw_axes(canvas, &plot, theme);

        canvas.save();
        canvas.clip_rect(skia::Rect::from_ltrb(plot.left, plot.top, plot.right, plot.bottom), skia::ClipOp::Intersect, true);
        for trace in &self.traces {
            match trace {
                Trace::Candlestick(candles) => draw_candles(canvas, &plot, &self.x_axis, &self.y_axis, candles, theme),
                Trace::Line { color, points, .. } => draw_line(canvas, &plot, &self.x_axis, &self.y_axis, points, *color),
                Trace::Level { color, value, span, .. } => draw_level(canvas, &plot, &self.x_axis, &self.y_axis, *value, *span, *color),
            }
        }
        canvas.restore();

        if opts.draw_labels {
            draw_ticks(canvas, &plot, &self.x_axis, &self.y_axis, theme);
            draw_legend(canvas, &plot, &self.traces, theme);
            draw_title(canvas, opts, &self.title, theme);
        }

        let image = surface.image_snapshot();
        #[allow(deprecated)]
        let data = image
            .encode_to_data(skia::EncodedImageFormat::PNG)
            .ok_or_else(|| anyhow::anyhow!("encode PNG failed"))?;
        Ok(data.as_bytes().to_vec())
    }
}

// ---- helpers ----------------------------------------------------------------

const X_TICKS: usize = 6;
const Y_TICKS: usize = 6;

fn stroke(color: skia::Color, width: f32) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Stroke);
    paint.set_stroke_width(width);
    paint.set_color(color);
    paint
}

fn fill(color: skia::Color) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Fill);
    paint.set_color(color);
    paint
}

fn font(size: f32) -> skia::Font {
    let mut font = skia::Font::default();
    font.set_size(size);
    font
}

fn draw_grid(canvas: &skia::Canvas, plot: &PlotRect, theme: &Theme) {
    let paint = stroke(theme.grid, 1.0);
    for i in 0..X_TICKS {
        let x = plot.left + plot.width() * i as f32 / (X_TICKS - 1) as f32;
        canvas.draw_line((x, plot.top), (x, plot.bottom), &paint);
    }
    for i in 0..Y_TICKS {
        let y = plot.top + plot.height() * i as f32 / (Y_TICKS - 1) as f32;
        canvas.draw_line((plot.left, y), (plot.right, y), &paint);
    }
}

fn draw_axes(canvas: &skia::Canvas, plot: &PlotRect, theme: &Theme) {
    let paint = stroke(theme.axis_line, 1.5);
    canvas.draw_line((plot.left, plot.bottom), (plot.right, plot.bottom), &paint);
    canvas.draw_line((plot.left, plot.top), (plot.left, plot.bottom), &paint);
}

fn draw_ticks(canvas: &skia::Canvas, plot: &PlotRect, x: &Axis, y: &Axis, theme: &Theme) {
    let tick_paint = fill(theme.tick);
    let label_paint = fill(theme.axis_label);
    let small = font(11.0);

    for (v, label) in x.ticks(X_TICKS) {
        let px = plot.x(v, x.min, x.max);
        let (w, _) = small.measure_str(&label, Some(&tick_paint));
        canvas.draw_str(&label, (px - w * 0.5, plot.bottom + 16.0), &small, &tick_paint);
    }
    for (v, label) in y.ticks(Y_TICKS) {
        let py = plot.y(v, y.min, y.max);
        let (w, _) = small.measure_str(&label, Some(&tick_paint));
        canvas.draw_str(&label, (plot.left - w - 6.0, py + 4.0), &small, &tick_paint);
    }

    let axis_font = font(13.0);
    let (w, _) = axis_font.measure_str(&x.label, Some(&label_paint));
    canvas.draw_str(&x.label, (plot.left + (plot.width() - w) * 0.5, plot.bottom + 40.0), &axis_font, &label_paint);
    canvas.draw_str(&y.label, (4.0, plot.top - 8.0), &axis_font, &label_paint);
}

fn draw_title(canvas: &skia::Canvas, opts: &RenderOptions, title: &str, theme: &Theme) {
    if title.is_empty() { return; }
    let paint = fill(theme.title);
    let f = font(16.0);
    let (w, _) = f.measure_str(title, Some(&paint));
    canvas.draw_str(title, ((opts.width as f32 - w) * 0.5, 26.0), &f, &paint);
}

fn draw_legend(canvas: &skia::Canvas, plot: &PlotRect, traces: &[Trace], theme: &Theme) {
    let text = fill(theme.axis_label);
    let f = font(11.0);
    let mut y = plot.top + 16.0;
    for trace in traces {
        let (name, color, dashed) = match trace {
            Trace::Candlestick(_) => continue,
            Trace::Line { name, color, .. } => (name, *color, false),
            Trace::Level { name, color, .. } => (name, *color, true),
        };
        let mut swatch = stroke(color, 2.0);
        if dashed {
            swatch.set_path_effect(skia::PathEffect::dash(&[4.0, 3.0], 0.0));
        }
        canvas.draw_line((plot.left + 8.0, y - 4.0), (plot.left + 28.0, y - 4.0), &swatch);
        canvas.draw_str(name, (plot.left + 34.0, y), &f, &text);
        y += 16.0;
    }
}

fn draw_line(canvas: &skia::Canvas, plot: &PlotRect, x: &Axis, y: &Axis, points: &[(f64, f64)], color: skia::Color) {
    if points.len() < 2 { return; }
    let mut path = skia::Path::new();
    let (x0, y0) = points[0];
    path.move_to((plot.x(x0, x.min, x.max), plot.y(y0, y.min, y.max)));
    for &(px, py) in &points[1..] {
        path.line_to((plot.x(px, x.min, x.max), plot.y(py, y.min, y.max)));
    }
    canvas.draw_path(&path, &stroke(color, 2.0));
}

fn draw_level(canvas: &skia::Canvas, plot: &PlotRect, x: &Axis, y: &Axis, value: f64, span: (f64, f64), color: skia::Color) {
    let mut paint = stroke(color, 1.5);
    paint.set_path_effect(skia::PathEffect::dash(&[8.0, 5.0], 0.0));
    let py = plot.y(value, y.min, y.max);
    canvas.draw_line((plot.x(span.0, x.min, x.max), py), (plot.x(span.1, x.min, x.max), py), &paint);
}

fn draw_candles(canvas: &skia::Canvas, plot: &PlotRect, x: &Axis, y: &Axis, candles: &[Candle], theme: &Theme) {
    if candles.is_empty() { return; }

    // Body width: ~70% of the per-day slot, never thinner than a hairline.
    let days = (x.max - x.min).max(1.0) as f32;
    let body_px = (plot.width() / days * 0.7).max(1.0);
    let half = body_px * 0.5;

    let mut wick = stroke(theme.candle_up, 1.0);
    let mut body = fill(theme.candle_up);

    for c in candles {
        let color = if c.c >= c.o { theme.candle_up } else { theme.candle_down };
        wick.set_color(color);
        body.set_color(color);

        let px = plot.x(c.t, x.min, x.max);
        canvas.draw_line((px, plot.y(c.h, y.min, y.max)), (px, plot.y(c.l, y.min, y.max)), &wick);

        let y_o = plot.y(c.o, y.min, y.max);
        let y_c = plot.y(c.c, y.min, y.max);
        let top = y_o.min(y_c);
        let bot = y_o.max(y_c);
        canvas.draw_rect(skia::Rect::from_ltrb(px - half, top, px + half, bot.max(top + 1.0)), &body);
    }
}
