// File: crates/fibdash-core/src/layout.rs
// Summary: Surface size defaults, insets, and the plot rectangle derived from them.

/// Default surface width in pixels.
pub const WIDTH: i32 = 1100;
/// Default surface height in pixels.
pub const HEIGHT: i32 = 640;

/// Screen margins, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Insets {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Insets {
    pub const fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self { left, right, top, bottom }
    }
}

impl Default for Insets {
    // Top leaves room for the title, bottom for date ticks and the axis title.
    fn default() -> Self {
        Self::new(80, 28, 52, 64)
    }
}

/// Plot area in pixels; `right > left` and `bottom > top` for any non-degenerate surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl PlotRect {
    pub fn new(width: i32, height: i32, insets: &Insets) -> Self {
        let left = insets.left as f32;
        let top = insets.top as f32;
        let right = (width as f32 - insets.right as f32).max(left + 1.0);
        let bottom = (height as f32 - insets.bottom as f32).max(top + 1.0);
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> f32 { self.right - self.left }
    pub fn height(&self) -> f32 { self.bottom - self.top }

    /// Map a data X in `[min, max]` onto the horizontal pixel span.
    #[inline]
    pub fn x(&self, v: f64, min: f64, max: f64) -> f32 {
        let span = (max - min).max(1e-9);
        self.left + ((v - min) / span) as f32 * self.width()
    }

    /// Map a data Y in `[min, max]` onto the vertical pixel span (larger values higher).
    #[inline]
    pub fn y(&self, v: f64, min: f64, max: f64) -> f32 {
        let span = (max - min).max(1e-9);
        self.bottom - ((v - min) / span) as f32 * self.height()
    }
}
