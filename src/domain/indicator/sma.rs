//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(v[i-n+1 ..= i]).
//! Warmup: first (n-1) points are undefined.

use crate::domain::indicator::{IndicatorKind, IndicatorSeries};
use crate::domain::series::TimeSeries;

pub fn sma(source: &TimeSeries, window: usize) -> IndicatorSeries {
    assert!(window > 0, "sma window must be positive");

    let values = (0..source.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let start = i + 1 - window;
                let sum: f64 = (start..=i).map(|j| source.value(j)).sum();
                Some(sum / window as f64)
            }
        })
        .collect();

    IndicatorSeries::from_values(IndicatorKind::Sma(window), source, values)
}
