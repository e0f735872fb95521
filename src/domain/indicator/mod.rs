//! Indicator series derived from price series.
//!
//! - `IndicatorPoint`: one dated value, `None` while the indicator is not
//!   yet defined (warm-up) or where the statistic degenerates
//! - `IndicatorKind`: indicator identity + parameters, used for labeling
//! - `IndicatorSeries`: the derived series, same date domain as its source
//!
//! Undefined points are ordinary data, not errors; rules and accounting
//! treat them as "no signal yet".

pub mod sma;
pub mod ema;
pub mod rsi;
pub mod volatility;
pub mod atr;

use chrono::NaiveDate;
use std::fmt;

use crate::domain::series::TimeSeries;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Volatility(usize),
    TrueRange,
    Atr(usize),
    VolRatio(usize),
    Diff,
    LogReturn,
    StrategyReturn,
    CumulativeReturn,
    ValueCurve,
    Pnl,
    CumulativePnl,
    Drawdown,
    MaxDrawdown,
    Weight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub kind: IndicatorKind,
    pub points: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn date(&self, index: usize) -> NaiveDate {
        self.points[index].date
    }

    /// Value at `index`, `None` while undefined.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.points[index].value
    }

    /// Index of the first defined point.
    pub fn first_defined(&self) -> Option<usize> {
        self.points.iter().position(|p| p.value.is_some())
    }

    /// Build a series over the dates of `source` from per-index values.
    pub fn from_values(
        kind: IndicatorKind,
        source: &TimeSeries,
        values: Vec<Option<f64>>,
    ) -> Self {
        assert_eq!(
            source.len(),
            values.len(),
            "indicator values must cover the source series"
        );
        let points = source
            .dates()
            .zip(values)
            .map(|(date, value)| IndicatorPoint { date, value })
            .collect();
        IndicatorSeries { kind, points }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Sma(window) => write!(f, "SMA({})", window),
            IndicatorKind::Ema(window) => write!(f, "EMA({})", window),
            IndicatorKind::Rsi(window) => write!(f, "RSI({})", window),
            IndicatorKind::Volatility(window) => write!(f, "VOLATILITY({})", window),
            IndicatorKind::TrueRange => write!(f, "TR"),
            IndicatorKind::Atr(window) => write!(f, "ATR({})", window),
            IndicatorKind::VolRatio(window) => write!(f, "VOLRATIO({})", window),
            IndicatorKind::Diff => write!(f, "DIFF"),
            IndicatorKind::LogReturn => write!(f, "LOGRET"),
            IndicatorKind::StrategyReturn => write!(f, "STRATRET"),
            IndicatorKind::CumulativeReturn => write!(f, "CUMRET"),
            IndicatorKind::ValueCurve => write!(f, "VALUE"),
            IndicatorKind::Pnl => write!(f, "PNL"),
            IndicatorKind::CumulativePnl => write!(f, "CUMPNL"),
            IndicatorKind::Drawdown => write!(f, "DRAWDOWN"),
            IndicatorKind::MaxDrawdown => write!(f, "MAXDRAWDOWN"),
            IndicatorKind::Weight => write!(f, "WEIGHT"),
        }
    }
}

/// One-step difference of a value series. The first point is undefined.
pub fn diff(source: &TimeSeries) -> IndicatorSeries {
    let values = (0..source.len())
        .map(|i| {
            if i == 0 {
                None
            } else {
                Some(source.value(i) - source.value(i - 1))
            }
        })
        .collect();
    IndicatorSeries::from_values(IndicatorKind::Diff, source, values)
}
