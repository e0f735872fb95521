//! Signal-to-return accounting.
//!
//! The engine trades on yesterday's information: a stance held at `t-1`
//! earns the market's log return over `(t-1, t]`. Undefined steps stay
//! undefined through the per-period series and contribute zero to running
//! sums.

use crate::domain::indicator::{IndicatorKind, IndicatorPoint, IndicatorSeries};
use crate::domain::position::PositionSeries;
use crate::domain::series::TimeSeries;

/// Per-period log returns: ln(p[t] / p[t-1]).
///
/// The first point is undefined, as is any step where either price is not
/// positive.
pub fn log_returns(prices: &TimeSeries) -> IndicatorSeries {
    let values = (0..prices.len())
        .map(|i| {
            if i == 0 {
                return None;
            }
            let (prev, curr) = (prices.value(i - 1), prices.value(i));
            if prev > 0.0 && curr > 0.0 {
                Some((curr / prev).ln())
            } else {
                None
            }
        })
        .collect();
    IndicatorSeries::from_values(IndicatorKind::LogReturn, prices, values)
}

/// Returns earned by holding `positions` against `market` returns.
///
/// strategy[t] = weight[t-1] × market[t]. The first point is undefined,
/// and an undefined market return stays undefined even for a flat stance.
pub fn strategy_returns(positions: &PositionSeries, market: &IndicatorSeries) -> IndicatorSeries {
    assert_eq!(
        positions.len(),
        market.len(),
        "positions and market returns must cover the same dates"
    );
    let points = (0..market.len())
        .map(|i| {
            let value = if i == 0 {
                None
            } else {
                market
                    .value(i)
                    .map(|r| positions.stance(i - 1).weight() * r)
            };
            IndicatorPoint {
                date: market.date(i),
                value,
            }
        })
        .collect();
    IndicatorSeries {
        kind: IndicatorKind::StrategyReturn,
        points,
    }
}

/// Daily mark-to-market of a sized position: units[t-1] × (close[t] - close[t-1]).
///
/// The first point is undefined, as is any step entered with undefined units.
pub fn position_pnl(units: &IndicatorSeries, closes: &TimeSeries) -> IndicatorSeries {
    assert_eq!(
        units.len(),
        closes.len(),
        "units and closes must cover the same dates"
    );
    let points = (0..closes.len())
        .map(|i| {
            let value = if i == 0 {
                None
            } else {
                units
                    .value(i - 1)
                    .map(|u| u * (closes.value(i) - closes.value(i - 1)))
            };
            IndicatorPoint {
                date: closes.date(i),
                value,
            }
        })
        .collect();
    IndicatorSeries {
        kind: IndicatorKind::Pnl,
        points,
    }
}

/// Running sum where undefined points contribute zero.
///
/// The output is defined at every index.
pub fn cumulative_sum(series: &IndicatorSeries) -> IndicatorSeries {
    let kind = match series.kind {
        IndicatorKind::Pnl => IndicatorKind::CumulativePnl,
        _ => IndicatorKind::CumulativeReturn,
    };
    let mut total = 0.0;
    let points = series
        .points
        .iter()
        .map(|p| {
            total += p.value.unwrap_or(0.0);
            IndicatorPoint {
                date: p.date,
                value: Some(total),
            }
        })
        .collect();
    IndicatorSeries { kind, points }
}

/// Growth of one unit of capital: e^cumulative[t].
pub fn compound(cumulative: &IndicatorSeries) -> IndicatorSeries {
    let points = cumulative
        .points
        .iter()
        .map(|p| IndicatorPoint {
            date: p.date,
            value: p.value.map(f64::exp),
        })
        .collect();
    IndicatorSeries {
        kind: IndicatorKind::ValueCurve,
        points,
    }
}

/// Account value curve: initial capital plus cumulative PnL.
pub fn account_curve(cumulative_pnl: &IndicatorSeries, initial: f64) -> IndicatorSeries {
    let points = cumulative_pnl
        .points
        .iter()
        .map(|p| IndicatorPoint {
            date: p.date,
            value: p.value.map(|v| initial + v),
        })
        .collect();
    IndicatorSeries {
        kind: IndicatorKind::ValueCurve,
        points,
    }
}
