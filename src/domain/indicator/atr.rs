//! Range-based volatility indicators from OHLC bars.
//!
//! - `true_range`: per-bar range against the previous close (first bar falls
//!   back to high - low); defined everywhere
//! - `atr`: Wilder-smoothed average true range, seeded with the simple mean
//!   of the first n ranges; warmup first (n-1) bars
//! - `vol_ratio`: today's range over the trailing average range, where the
//!   trailing average is sum(TR over the last n bars) / (n-1) with an
//!   expanding front, so the series is defined from the first bar

use crate::domain::indicator::{IndicatorKind, IndicatorPoint, IndicatorSeries};
use crate::domain::ohlcv::OhlcvBar;

pub fn true_range(bars: &[OhlcvBar]) -> IndicatorSeries {
    let points = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let tr = if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            };
            IndicatorPoint {
                date: bar.date,
                value: Some(tr),
            }
        })
        .collect();

    IndicatorSeries {
        kind: IndicatorKind::TrueRange,
        points,
    }
}

pub fn atr(bars: &[OhlcvBar], window: usize) -> IndicatorSeries {
    assert!(window > 0, "atr window must be positive");

    let tr = true_range(bars);
    let mut points = Vec::with_capacity(bars.len());
    let mut current = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        let value = if i + 1 < window {
            None
        } else if i + 1 == window {
            current = tr.points[..=i]
                .iter()
                .map(|p| p.value.unwrap_or(0.0))
                .sum::<f64>()
                / window as f64;
            Some(current)
        } else {
            let range = tr.value(i).unwrap_or(0.0);
            current = (current * (window - 1) as f64 + range) / window as f64;
            Some(current)
        };
        points.push(IndicatorPoint {
            date: bar.date,
            value,
        });
    }

    IndicatorSeries {
        kind: IndicatorKind::Atr(window),
        points,
    }
}

pub fn vol_ratio(bars: &[OhlcvBar], window: usize) -> IndicatorSeries {
    assert!(window > 1, "vol ratio window must be at least 2");

    let tr = true_range(bars);
    let points = (0..bars.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let trailing_sum: f64 = tr.points[start..=i]
                .iter()
                .map(|p| p.value.unwrap_or(0.0))
                .sum();
            let value = if trailing_sum == 0.0 {
                None
            } else {
                let trailing_avg = trailing_sum / (window - 1) as f64;
                Some(tr.value(i).unwrap_or(0.0) / trailing_avg)
            };
            IndicatorPoint {
                date: bars[i].date,
                value,
            }
        })
        .collect();

    IndicatorSeries {
        kind: IndicatorKind::VolRatio(window),
        points,
    }
}
