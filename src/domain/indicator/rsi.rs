//! RSI (Relative Strength Index).
//!
//! Wilder's smoothing over signed one-step changes:
//! - First averages: simple mean of up/down moves over the first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! RSI = 100 - 100/(1 + avg_up/avg_down), 100 when avg_down == 0.
//! Warmup: first n points are undefined (n changes are needed for the seed,
//! and changes only start at the second point).

use crate::domain::indicator::{IndicatorKind, IndicatorSeries};
use crate::domain::series::TimeSeries;

pub fn rsi(source: &TimeSeries, window: usize) -> IndicatorSeries {
    assert!(window > 0, "rsi window must be positive");

    let n = source.len();
    let mut values = vec![None; n];

    if n > window {
        let mut ups = Vec::with_capacity(n - 1);
        let mut downs = Vec::with_capacity(n - 1);
        for i in 1..n {
            let change = source.value(i) - source.value(i - 1);
            ups.push(if change > 0.0 { change } else { 0.0 });
            downs.push(if change < 0.0 { -change } else { 0.0 });
        }

        let mut avg_up = ups[..window].iter().sum::<f64>() / window as f64;
        let mut avg_down = downs[..window].iter().sum::<f64>() / window as f64;
        values[window] = Some(rsi_value(avg_up, avg_down));

        for i in window + 1..n {
            let change_idx = i - 1;
            avg_up = (avg_up * (window - 1) as f64 + ups[change_idx]) / window as f64;
            avg_down = (avg_down * (window - 1) as f64 + downs[change_idx]) / window as f64;
            values[i] = Some(rsi_value(avg_up, avg_down));
        }
    }

    IndicatorSeries::from_values(IndicatorKind::Rsi(window), source, values)
}

fn rsi_value(avg_up: f64, avg_down: f64) -> f64 {
    if avg_down == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_up / avg_down)
    }
}
