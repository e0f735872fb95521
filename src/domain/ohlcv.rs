//! OHLCV bar representation.

use chrono::NaiveDate;

use crate::domain::series::{TimePoint, TimeSeries};

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Bar field a value series can be drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    Open,
    Close,
}

impl PriceField {
    pub fn of(&self, bar: &OhlcvBar) -> f64 {
        match self {
            PriceField::Open => bar.open,
            PriceField::Close => bar.close,
        }
    }

    /// Extract one field of every bar as a value series.
    pub fn series(&self, bars: &[OhlcvBar]) -> TimeSeries {
        TimeSeries::new(
            bars.iter()
                .map(|bar| TimePoint {
                    date: bar.date,
                    value: self.of(bar),
                })
                .collect(),
        )
    }
}
