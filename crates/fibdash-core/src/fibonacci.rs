// File: crates/fibdash-core/src/fibonacci.rs
// Summary: Fibonacci retracement/extension/projection/expansion levels over high, low and pivot prices.
// Notes:
// - `compute` is a pure function of its numeric inputs and does no validation;
//   `FibonacciInput::levels` is the guarded entry point used by the dashboard.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::error::DashboardError;
use crate::series::PriceSeries;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FibMethod {
    Retracement,
    Extension,
    PriceProjection,
    Expansion,
    RetracementExtension,
    ProjectionExpansion,
}

impl FibMethod {
    pub const ALL: [FibMethod; 6] = [
        FibMethod::Retracement,
        FibMethod::Extension,
        FibMethod::PriceProjection,
        FibMethod::Expansion,
        FibMethod::RetracementExtension,
        FibMethod::ProjectionExpansion,
    ];
}

/// Family a level belongs to; selects the formula for combined methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    Retracement,
    Extension,
    Projection,
    Expansion,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FibLevel {
    pub kind: LevelKind,
    pub label: String,
    pub ratio: f64,
    pub price: f64,
}

/// Levels in canonical display order for the method that produced them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FibonacciLevelSet {
    pub method: FibMethod,
    pub levels: Vec<FibLevel>,
}

impl FibonacciLevelSet {
    pub fn get(&self, label: &str) -> Option<f64> {
        self.levels.iter().find(|l| l.label == label).map(|l| l.price)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.levels.iter().map(|l| l.label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FibLevel> {
        self.levels.iter()
    }

    pub fn len(&self) -> usize { self.levels.len() }
    pub fn is_empty(&self) -> bool { self.levels.is_empty() }
}

const RETRACEMENT: [f64; 5] = [0.236, 0.382, 0.5, 0.618, 0.786];
const EXTENSION: [f64; 4] = [1.272, 1.618, 2.0, 2.618];
const PRICE_PROJECTION: [f64; 3] = [1.618, 2.0, 2.618];
const EXPANSION: [f64; 2] = [1.618, 2.618];

type Leg = (LevelKind, &'static str, f64);

// RET and EXT share one formula per action.
const RETRACEMENT_EXTENSION: [Leg; 10] = [
    (LevelKind::Retracement, "RET 38%", 0.38196601125010515),
    (LevelKind::Retracement, "RET 50%", 0.5),
    (LevelKind::Retracement, "RET 62%", 0.6180339887498949),
    (LevelKind::Retracement, "RET 79%", 0.7861513777574233),
    (LevelKind::Retracement, "RET 89%", 0.886651779),
    (LevelKind::Extension, "EXT 100%", 1.0),
    (LevelKind::Extension, "EXT 113%", 1.127838485),
    (LevelKind::Extension, "EXT 127%", 1.272019649514069),
    (LevelKind::Extension, "EXT 162%", 1.6180339887498949),
    (LevelKind::Extension, "EXT 262%", 2.6180339887498949),
];

const PROJECTION_EXPANSION: [Leg; 13] = [
    (LevelKind::Projection, "PP 62%", 0.6180339887498949),
    (LevelKind::Projection, "PP 79%", 0.7861513777574233),
    (LevelKind::Projection, "PP 89%", 0.887),
    (LevelKind::Projection, "PP 100%", 1.0),
    (LevelKind::Projection, "PP 113%", 1.128),
    (LevelKind::Projection, "PP 127%", 1.272),
    (LevelKind::Projection, "PP 162%", 1.618),
    (LevelKind::Projection, "PP 262%", 2.618),
    (LevelKind::Expansion, "EXP 38%", 0.382),
    (LevelKind::Expansion, "EXP 50%", 0.5),
    (LevelKind::Expansion, "EXP 62%", 0.618),
    (LevelKind::Expansion, "EXP 100%", 1.0),
    (LevelKind::Expansion, "EXP 162%", 1.618),
];

/// Compute the level set for `method`.
///
/// Single-leg methods scale the signed range `high - low` and ignore `action` and
/// `pivot`. Combined methods scale `|high - low|` and branch on `action`.
pub fn compute(high: f64, low: f64, pivot: f64, action: Action, method: FibMethod) -> FibonacciLevelSet {
    let range = high - low;
    let levels = match method {
        FibMethod::Retracement => single_leg(LevelKind::Retracement, &RETRACEMENT, |r| high - range * r),
        FibMethod::Extension => single_leg(LevelKind::Extension, &EXTENSION, |r| high + range * r),
        FibMethod::PriceProjection => single_leg(LevelKind::Projection, &PRICE_PROJECTION, |r| low + range * r),
        FibMethod::Expansion => single_leg(LevelKind::Expansion, &EXPANSION, |r| high + range * r),
        FibMethod::RetracementExtension => combined(&RETRACEMENT_EXTENSION, high, low, pivot, action),
        FibMethod::ProjectionExpansion => combined(&PROJECTION_EXPANSION, high, low, pivot, action),
    };
    FibonacciLevelSet { method, levels }
}

fn single_leg(kind: LevelKind, ratios: &[f64], price: impl Fn(f64) -> f64) -> Vec<FibLevel> {
    ratios
        .iter()
        .map(|&ratio| FibLevel { kind, label: percent_label(ratio), ratio, price: price(ratio) })
        .collect()
}

fn combined(legs: &[Leg], high: f64, low: f64, pivot: f64, action: Action) -> Vec<FibLevel> {
    let span = (high - low).abs();
    legs.iter()
        .map(|&(kind, label, ratio)| {
            let offset = span * ratio;
            let price = match (kind, action) {
                (LevelKind::Retracement | LevelKind::Extension, Action::Buy) => high - offset,
                (LevelKind::Retracement | LevelKind::Extension, Action::Sell) => low + offset,
                (LevelKind::Projection, Action::Buy) => pivot - offset,
                (LevelKind::Projection, Action::Sell) => pivot + offset,
                (LevelKind::Expansion, Action::Buy) => low - offset,
                (LevelKind::Expansion, Action::Sell) => high + offset,
            };
            FibLevel { kind, label: label.to_string(), ratio, price }
        })
        .collect()
}

/// Whole percent of `ratio`, rounded down: 0.382 -> "38%", 2.618 -> "261%".
fn percent_label(ratio: f64) -> String {
    format!("{}%", (ratio * 100.0).floor() as i64)
}

/// Calculator inputs as entered by the user (or derived from a series).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FibonacciInput {
    pub high: f64,
    pub low: f64,
    pub pivot: f64,
    pub action: Action,
    pub method: FibMethod,
}

impl FibonacciInput {
    pub fn new(high: f64, low: f64, pivot: f64) -> Self {
        Self { high, low, pivot, action: Action::Buy, method: FibMethod::Retracement }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub fn with_method(mut self, method: FibMethod) -> Self {
        self.method = method;
        self
    }

    /// Compute levels, refusing non-positive high or low prices.
    pub fn levels(&self) -> Result<FibonacciLevelSet, DashboardError> {
        if !(self.high > 0.0 && self.low > 0.0) {
            return Err(DashboardError::InsufficientInput { high: self.high, low: self.low });
        }
        Ok(compute(self.high, self.low, self.pivot, self.action, self.method))
    }
}

/// High/low/pivot taken from the tail of a price series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SwingRange {
    pub high: f64,
    pub low: f64,
    pub pivot: f64,
}

impl SwingRange {
    /// Highest high and lowest low over the last `lookback` records (all when `None`);
    /// the pivot is their midpoint.
    pub fn from_series(series: &PriceSeries, lookback: Option<usize>) -> Option<Self> {
        let window = match lookback {
            Some(n) => series.tail(n),
            None => series.records(),
        };
        let first = window.first()?;
        let (mut high, mut low) = (first.high, first.low);
        for r in &window[1..] {
            high = high.max(r.high);
            low = low.min(r.low);
        }
        Some(Self { high, low, pivot: (high + low) / 2.0 })
    }
}

/// Calculator inputs where any price may be left blank and taken from a series instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FibonacciEntry {
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub pivot: Option<f64>,
    pub action: Action,
    pub method: FibMethod,
    /// Records used for the derived swing (all when `None`).
    pub lookback: Option<usize>,
}

impl FibonacciEntry {
    pub fn needs_series(&self) -> bool {
        self.high.is_none() || self.low.is_none() || self.pivot.is_none()
    }

    /// Fill blank prices from the swing of `series`. Still-blank prices become 0, which
    /// `FibonacciInput::levels` rejects.
    pub fn resolve(&self, series: Option<&PriceSeries>) -> FibonacciInput {
        let swing = series
            .filter(|_| self.needs_series())
            .and_then(|s| SwingRange::from_series(s, self.lookback));
        let high = self.high.or(swing.map(|s| s.high)).unwrap_or(0.0);
        let low = self.low.or(swing.map(|s| s.low)).unwrap_or(0.0);
        let pivot = self.pivot.or(swing.map(|s| s.pivot)).unwrap_or(0.0);
        FibonacciInput::new(high, low, pivot).with_action(self.action).with_method(self.method)
    }
}

impl From<FibonacciInput> for FibonacciEntry {
    fn from(input: FibonacciInput) -> Self {
        Self {
            high: Some(input.high),
            low: Some(input.low),
            pivot: Some(input.pivot),
            action: input.action,
            method: input.method,
            lookback: None,
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown {what} {value:?} (expected one of: {expected})")]
pub struct ParseChoiceError {
    what: &'static str,
    value: String,
    expected: &'static str,
}

fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_' | '/' | '&'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for Action {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "buy" | "long" => Ok(Action::Buy),
            "sell" | "short" => Ok(Action::Sell),
            _ => Err(ParseChoiceError { what: "action", value: s.to_string(), expected: "buy, sell" }),
        }
    }
}

impl FromStr for FibMethod {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "retracement" | "ret" => Ok(FibMethod::Retracement),
            "extension" | "ext" => Ok(FibMethod::Extension),
            "priceprojection" | "projection" | "pp" => Ok(FibMethod::PriceProjection),
            "expansion" | "exp" => Ok(FibMethod::Expansion),
            "retracementextension" | "retext" => Ok(FibMethod::RetracementExtension),
            "projectionexpansion" | "priceprojectionexpansion" | "ppexp" => Ok(FibMethod::ProjectionExpansion),
            _ => Err(ParseChoiceError {
                what: "method",
                value: s.to_string(),
                expected: "retracement, extension, price-projection, expansion, retracement-extension, projection-expansion",
            }),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Buy => "Buy",
            Action::Sell => "Sell",
        })
    }
}

impl fmt::Display for FibMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FibMethod::Retracement => "Retracement",
            FibMethod::Extension => "Extension",
            FibMethod::PriceProjection => "Price Projection",
            FibMethod::Expansion => "Expansion",
            FibMethod::RetracementExtension => "Retracement & Extension",
            FibMethod::ProjectionExpansion => "Price Projection & Expansion",
        })
    }
}
