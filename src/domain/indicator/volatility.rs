//! Annualized rolling volatility.
//!
//! Sample standard deviation (n-1 denominator) of one-step log returns over
//! the window, scaled by sqrt(252). A point is defined only when every log
//! return in its window is defined, so the first defined point sits at index
//! `window` (the return at index 0 is always undefined). A window of 1 has
//! no dispersion estimate and yields an entirely undefined series.

use crate::domain::backtest::log_returns;
use crate::domain::indicator::{IndicatorKind, IndicatorSeries};
use crate::domain::metrics::TRADING_DAYS_PER_YEAR;
use crate::domain::series::TimeSeries;

pub fn volatility(source: &TimeSeries, window: usize) -> IndicatorSeries {
    assert!(window > 0, "volatility window must be positive");

    let rets = log_returns(source);
    let n = source.len();
    let mut values = vec![None; n];

    if window >= 2 {
        for i in 0..n {
            if i + 1 < window {
                continue;
            }
            let start = i + 1 - window;
            let window_rets: Option<Vec<f64>> =
                (start..=i).map(|j| rets.value(j)).collect();
            values[i] = window_rets.map(|r| {
                let mean = r.iter().sum::<f64>() / window as f64;
                let var = r.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>()
                    / (window - 1) as f64;
                var.sqrt() * TRADING_DAYS_PER_YEAR.sqrt()
            });
        }
    }

    IndicatorSeries::from_values(IndicatorKind::Volatility(window), source, values)
}
