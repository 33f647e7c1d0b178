// File: crates/fibdash-core/src/raw.rs
// Summary: Un-cleaned, column-oriented frame as delivered by a market-data provider.

use chrono::NaiveDate;

/// A single raw value. Providers hand over whatever they parsed; cleaning happens later.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Parse a textual cell the way CSV exports encode values.
    pub fn parse(s: &str) -> Self {
        let t = s.trim();
        if t.is_empty() {
            return Cell::Missing;
        }
        match t.parse::<f64>() {
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(t.to_string()),
        }
    }

    /// Numeric coercion: text that does not parse, NaN and infinities become `None`.
    pub fn to_number(&self) -> Option<f64> {
        let v = match self {
            Cell::Number(v) => *v,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Missing => return None,
        };
        v.is_finite().then_some(v)
    }

    pub fn is_text(&self) -> bool { matches!(self, Cell::Text(_)) }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self { Cell::Number(v) }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self { Cell::Text(s.to_string()) }
}

/// One column; `header` holds every header level, outermost first.
#[derive(Clone, Debug, PartialEq)]
pub struct RawColumn {
    pub header: Vec<String>,
    pub cells: Vec<Cell>,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self { header: vec![name.into()], cells }
    }

    pub fn with_levels(header: Vec<String>, cells: Vec<Cell>) -> Self {
        Self { header, cells }
    }

    /// Normalized column name: header level 0, trimmed.
    pub fn name(&self) -> &str {
        self.header.first().map(|s| s.trim()).unwrap_or("")
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawFrame {
    pub index: Vec<NaiveDate>,
    pub columns: Vec<RawColumn>,
}

impl RawFrame {
    pub fn new(index: Vec<NaiveDate>) -> Self {
        Self { index, columns: Vec::new() }
    }

    pub fn with_column(mut self, column: RawColumn) -> Self {
        self.columns.push(column);
        self
    }

    pub fn len(&self) -> usize { self.index.len() }
    pub fn is_empty(&self) -> bool { self.index.is_empty() }

    /// First column whose normalized name matches `name`, ignoring ASCII case.
    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.columns.iter().find(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// Keep only rows whose date satisfies `keep`; columns shorter than the index are left short.
    pub fn retain_rows(&mut self, keep: impl Fn(NaiveDate) -> bool) {
        let mask: Vec<bool> = self.index.iter().map(|&d| keep(d)).collect();
        let mut it = mask.iter();
        self.index.retain(|_| *it.next().unwrap_or(&false));
        for col in &mut self.columns {
            let mut it = mask.iter();
            col.cells.retain(|_| *it.next().unwrap_or(&false));
        }
    }
}
