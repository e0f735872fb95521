//! Position sizing for the staged trend rule.
//!
//! All policies start from a per-instrument risk budget
//! (AUM × riskFraction / instruments) and deploy stageFraction of the
//! target size, signed by trade direction. A zero true range leaves the
//! step undefined (no dispersion to size against); steps before the first
//! trend decision size to zero.

use std::fmt;

use crate::domain::indicator::atr::true_range;
use crate::domain::indicator::{IndicatorKind, IndicatorPoint, IndicatorSeries};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::rule::pyramid::{Direction, PyramidSeries};

#[derive(Debug, Clone, Copy)]
pub struct SizingConfig {
    pub aum: f64,
    pub risk_fraction: f64,
    pub instruments: usize,
}

impl Default for SizingConfig {
    fn default() -> Self {
        SizingConfig {
            aum: 1_000_000.0,
            risk_fraction: 0.20,
            instruments: 10,
        }
    }
}

impl SizingConfig {
    fn risk_per_instrument(&self) -> f64 {
        assert!(self.instruments > 0, "instrument count must be positive");
        self.aum * self.risk_fraction / self.instruments as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingPolicy {
    /// Fixed risk budget against the true range.
    ConstantRisk,
    /// Risk budget re-levels with realized PnL, weighted by `pnl_fraction`.
    MarketMoney { pnl_fraction: f64 },
    /// Larger of the range target and the price target; falls back to the
    /// range target where the price target is undefined.
    RiskOrPrice,
}

impl fmt::Display for SizingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizingPolicy::ConstantRisk => write!(f, "constant-risk"),
            SizingPolicy::MarketMoney { pnl_fraction } => {
                write!(f, "market-money({})", pnl_fraction)
            }
            SizingPolicy::RiskOrPrice => write!(f, "risk-or-price"),
        }
    }
}

/// Signed units to hold each day.
pub fn size_positions(
    pyramid: &PyramidSeries,
    bars: &[OhlcvBar],
    policy: SizingPolicy,
    config: &SizingConfig,
) -> IndicatorSeries {
    assert_eq!(
        pyramid.len(),
        bars.len(),
        "pyramid series must cover the bars"
    );

    let ranges = true_range(bars);
    let mut points = Vec::with_capacity(bars.len());
    let mut cum_pnl = 0.0;

    for (i, point) in pyramid.points.iter().enumerate() {
        if let SizingPolicy::MarketMoney { .. } = policy {
            // Mark yesterday's units to market before sizing today.
            if i > 0 {
                if let Some(units) = points[i - 1] {
                    cum_pnl += units * (bars[i].close - bars[i - 1].close);
                }
            }
        }

        let sign = match point.direction {
            Some(Direction::Buy) => 1.0,
            Some(Direction::Sell) => -1.0,
            None => {
                points.push(Some(0.0));
                continue;
            }
        };

        let budget = match policy {
            SizingPolicy::MarketMoney { pnl_fraction } => {
                (config.aum * config.risk_fraction + cum_pnl * pnl_fraction)
                    / config.instruments as f64
            }
            _ => config.risk_per_instrument(),
        };

        let range = ranges.value(i).unwrap_or(0.0);
        let units = match policy {
            SizingPolicy::RiskOrPrice => {
                if range == 0.0 {
                    None
                } else {
                    let range_target = budget / range;
                    let price_target = if bars[i].close > 0.0 {
                        Some(budget / bars[i].close)
                    } else {
                        None
                    };
                    Some(match price_target {
                        Some(p) if p > range_target => p,
                        _ => range_target,
                    })
                }
            }
            _ => {
                if range == 0.0 {
                    None
                } else {
                    Some(budget / range)
                }
            }
        };

        points.push(units.map(|target| sign * target * point.stage_fraction));
    }

    IndicatorSeries {
        kind: IndicatorKind::Weight,
        points: bars
            .iter()
            .zip(points)
            .map(|(bar, value)| IndicatorPoint {
                date: bar.date,
                value,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rule::pyramid::{PyramidPoint, PyramidProfile};
    use chrono::NaiveDate;

    fn make_bar(day: u32, high: f64, low: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            ticker: "TEST".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1000,
        }
    }

    fn pyramid_over(
        bars: &[OhlcvBar],
        direction: Option<Direction>,
        stage_fraction: f64,
    ) -> PyramidSeries {
        PyramidSeries {
            profile: PyramidProfile::Upright,
            points: bars
                .iter()
                .map(|bar| PyramidPoint {
                    date: bar.date,
                    direction,
                    progress: 0,
                    stage_fraction,
                })
                .collect(),
        }
    }

    fn config() -> SizingConfig {
        SizingConfig {
            aum: 1000.0,
            risk_fraction: 0.2,
            instruments: 1,
        }
    }

    #[test]
    fn constant_risk_units() {
        let bars = vec![make_bar(1, 12.0, 8.0, 10.0)];
        let pyramid = pyramid_over(&bars, Some(Direction::Buy), 1.0);
        let sized = size_positions(&pyramid, &bars, SizingPolicy::ConstantRisk, &config());
        // budget 200, range 4 → 50 units.
        assert_eq!(sized.value(0), Some(50.0));
    }

    #[test]
    fn sell_direction_is_negative() {
        let bars = vec![make_bar(1, 12.0, 8.0, 10.0)];
        let pyramid = pyramid_over(&bars, Some(Direction::Sell), 0.5);
        let sized = size_positions(&pyramid, &bars, SizingPolicy::ConstantRisk, &config());
        assert_eq!(sized.value(0), Some(-25.0));
    }

    #[test]
    fn no_direction_sizes_to_zero() {
        let bars = vec![make_bar(1, 12.0, 8.0, 10.0)];
        let pyramid = pyramid_over(&bars, None, 0.0);
        let sized = size_positions(&pyramid, &bars, SizingPolicy::ConstantRisk, &config());
        assert_eq!(sized.value(0), Some(0.0));
    }

    #[test]
    fn zero_range_is_undefined() {
        let bars = vec![make_bar(1, 10.0, 10.0, 10.0)];
        let pyramid = pyramid_over(&bars, Some(Direction::Buy), 1.0);
        let sized = size_positions(&pyramid, &bars, SizingPolicy::ConstantRisk, &config());
        assert_eq!(sized.value(0), None);
    }

    #[test]
    fn market_money_relevels_with_pnl() {
        // Ranges stay 4; close moves 10 → 12.
        let bars = vec![make_bar(1, 12.0, 8.0, 10.0), make_bar(2, 14.0, 10.0, 12.0)];
        let pyramid = pyramid_over(&bars, Some(Direction::Buy), 1.0);
        let sized = size_positions(
            &pyramid,
            &bars,
            SizingPolicy::MarketMoney { pnl_fraction: 0.5 },
            &config(),
        );
        // Day 1: budget 200/4 = 50 units. Day 2: pnl = 50 × 2 = 100,
        // budget 200 + 50 = 250, units 62.5.
        assert_eq!(sized.value(0), Some(50.0));
        assert_eq!(sized.value(1), Some(62.5));
    }

    #[test]
    fn risk_or_price_takes_larger_target() {
        // Range target 200/4 = 50, price target 200/2 = 100 → 100.
        let bars = vec![make_bar(1, 4.0, 0.0, 2.0)];
        let pyramid = pyramid_over(&bars, Some(Direction::Buy), 1.0);
        let sized = size_positions(&pyramid, &bars, SizingPolicy::RiskOrPrice, &config());
        assert_eq!(sized.value(0), Some(100.0));

        // Range target 200/4 = 50 beats price target 200/10 = 20.
        let bars = vec![make_bar(1, 12.0, 8.0, 10.0)];
        let pyramid = pyramid_over(&bars, Some(Direction::Buy), 1.0);
        let sized = size_positions(&pyramid, &bars, SizingPolicy::RiskOrPrice, &config());
        assert_eq!(sized.value(0), Some(50.0));
    }
}
