// File: crates/fibdash-core/src/view.rs
// Visible data ranges and autoscale over every trace in a chart.

use crate::chart::{Chart, Trace};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ViewState {
    /// Bounds covering candles (low..high), line points and level values, with a 2% Y margin.
    /// Falls back to the unit square when the chart holds no data.
    pub fn fit(chart: &Chart) -> Self {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for trace in &chart.traces {
            match trace {
                Trace::Candlestick(candles) => {
                    for c in candles {
                        x_min = x_min.min(c.t);
                        x_max = x_max.max(c.t);
                        y_min = y_min.min(c.l);
                        y_max = y_max.max(c.h);
                    }
                }
                Trace::Line { points, .. } => {
                    for &(x, y) in points {
                        x_min = x_min.min(x);
                        x_max = x_max.max(x);
                        y_min = y_min.min(y);
                        y_max = y_max.max(y);
                    }
                }
                Trace::Level { value, span, .. } => {
                    x_min = x_min.min(span.0);
                    x_max = x_max.max(span.1);
                    y_min = y_min.min(*value);
                    y_max = y_max.max(*value);
                }
            }
        }
        if !x_min.is_finite() || !x_max.is_finite() || !y_min.is_finite() || !y_max.is_finite() {
            return Self { x_min: 0.0, x_max: 1.0, y_min: 0.0, y_max: 1.0 };
        }
        // Half a day of padding keeps the first and last candle bodies inside the plot.
        x_min -= 0.5;
        x_max += 0.5;
        if (y_max - y_min).abs() < 1e-9 { y_max = y_min + 1.0; }
        let ym = (y_max - y_min) * 0.02;
        Self { x_min, x_max, y_min: y_min - ym, y_max: y_max + ym }
    }

    pub fn apply_to_chart(&self, chart: &mut Chart) {
        chart.x_axis.min = self.x_min;
        chart.x_axis.max = self.x_max;
        chart.y_axis.min = self.y_min;
        chart.y_axis.max = self.y_max;
    }
}
