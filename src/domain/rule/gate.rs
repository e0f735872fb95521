//! Trailing performance gate.
//!
//! Filters a raw position series by its own track record: the position at
//! step t passes through only where yesterday's cumulative raw strategy
//! return exceeded yesterday's rolling mean of that cumulative. Everything
//! else, including the first step and the rolling mean's warm-up, is gated
//! to flat. Gating at t uses information up to t-1 only.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::position::{PositionPoint, PositionSeries, Stance};

pub fn trailing_gate(
    raw: &PositionSeries,
    raw_returns: &IndicatorSeries,
    window: usize,
) -> PositionSeries {
    assert!(window > 0, "gate window must be positive");
    assert_eq!(
        raw.len(),
        raw_returns.len(),
        "positions and returns must cover the same dates"
    );

    let mut cumulative = Vec::with_capacity(raw_returns.len());
    let mut acc = 0.0;
    for point in &raw_returns.points {
        acc += point.value.unwrap_or(0.0);
        cumulative.push(acc);
    }

    let rolling_mean: Vec<Option<f64>> = (0..cumulative.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let start = i + 1 - window;
                Some(cumulative[start..=i].iter().sum::<f64>() / window as f64)
            }
        })
        .collect();

    let points = raw
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let active = i > 0
                && matches!(rolling_mean[i - 1], Some(mean) if cumulative[i - 1] > mean);
            PositionPoint {
                date: p.date,
                stance: if active { p.stance } else { Stance::Flat },
            }
        })
        .collect();
    PositionSeries { points }
}
