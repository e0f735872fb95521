//! Performance statistics over return series and value curves.

use std::fmt;

use crate::domain::backtest::{compound, cumulative_sum};
use crate::domain::indicator::{IndicatorKind, IndicatorPoint, IndicatorSeries};
use crate::domain::series::TimeSeries;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Rolling maximum with an expanding front: the window grows from 1 until
/// it reaches `window`, then slides. Undefined points are skipped; a window
/// with no defined point yields an undefined peak.
pub fn rolling_max(curve: &IndicatorSeries, window: usize) -> IndicatorSeries {
    assert!(window > 0, "rolling max window must be positive");
    let points = (0..curve.len())
        .map(|i| {
            let start = i.saturating_sub(window - 1);
            let mut value: Option<f64> = None;
            for j in start..=i {
                if let Some(v) = curve.value(j) {
                    value = Some(match value {
                        Some(m) => m.max(v),
                        None => v,
                    });
                }
            }
            IndicatorPoint {
                date: curve.date(i),
                value,
            }
        })
        .collect();
    IndicatorSeries {
        kind: curve.kind,
        points,
    }
}

/// Drawdown from the rolling peak: curve[t] / peak[t] - 1.
///
/// Undefined where the curve or peak is undefined, or where the peak is 0.
pub fn drawdown(curve: &IndicatorSeries, peak: &IndicatorSeries) -> IndicatorSeries {
    assert_eq!(
        curve.len(),
        peak.len(),
        "curve and peak must cover the same dates"
    );
    let points = (0..curve.len())
        .map(|i| {
            let value = match (curve.value(i), peak.value(i)) {
                (Some(c), Some(p)) if p != 0.0 => Some(c / p - 1.0),
                _ => None,
            };
            IndicatorPoint {
                date: curve.date(i),
                value,
            }
        })
        .collect();
    IndicatorSeries {
        kind: IndicatorKind::Drawdown,
        points,
    }
}

/// Rolling minimum of the drawdown series: the worst drawdown inside the
/// window, with the same expanding front as [`rolling_max`]. A trough that
/// scrolled out of the window is forgotten.
pub fn max_drawdown(drawdown: &IndicatorSeries, window: usize) -> IndicatorSeries {
    assert!(window > 0, "max drawdown window must be positive");
    let points = (0..drawdown.len())
        .map(|i| {
            let start = i.saturating_sub(window - 1);
            let mut value: Option<f64> = None;
            for j in start..=i {
                if let Some(v) = drawdown.value(j) {
                    value = Some(match value {
                        Some(w) => w.min(v),
                        None => v,
                    });
                }
            }
            IndicatorPoint {
                date: drawdown.date(i),
                value,
            }
        })
        .collect();
    IndicatorSeries {
        kind: IndicatorKind::MaxDrawdown,
        points,
    }
}

/// Pearson correlation of two aligned series.
///
/// `None` for fewer than two points or when either series has zero variance.
pub fn correlation(a: &TimeSeries, b: &TimeSeries) -> Option<f64> {
    assert_eq!(
        a.len(),
        b.len(),
        "correlated series must cover the same dates"
    );
    let n = a.len();
    if n < 2 {
        return None;
    }

    let mean_a = (0..n).map(|i| a.value(i)).sum::<f64>() / n as f64;
    let mean_b = (0..n).map(|i| b.value(i)).sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..n {
        let da = a.value(i) - mean_a;
        let db = b.value(i) - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}

/// Denominator for the optimal-f win probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinRateBasis {
    /// Wins over the full series length, undefined points included.
    FullSeries,
    /// Wins over the in-sample slice length.
    InSample,
}

impl WinRateBasis {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "full-series" => Some(WinRateBasis::FullSeries),
            "in-sample" => Some(WinRateBasis::InSample),
            _ => None,
        }
    }
}

impl fmt::Display for WinRateBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinRateBasis::FullSeries => write!(f, "full-series"),
            WinRateBasis::InSample => write!(f, "in-sample"),
        }
    }
}

/// Optimal fixed fraction from the in-sample win/loss profile.
///
/// The first `floor(len × sample_fraction)` points form the in-sample
/// slice. p = in-sample wins / basis length; payoff = mean(win) /
/// |mean(loss)|; f = p × (payoff + 1) - 1 / payoff. `None` when the slice
/// has no winners or no losers.
pub fn optimal_f(
    returns: &IndicatorSeries,
    sample_fraction: f64,
    basis: WinRateBasis,
) -> Option<f64> {
    assert!(
        (0.0..=1.0).contains(&sample_fraction),
        "sample fraction must lie in [0, 1]"
    );

    let n = returns.len();
    let split = (n as f64 * sample_fraction).floor() as usize;

    let mut wins = 0usize;
    let mut losses = 0usize;
    let mut win_total = 0.0;
    let mut loss_total = 0.0;
    for point in &returns.points[..split] {
        match point.value {
            Some(v) if v > 0.0 => {
                wins += 1;
                win_total += v;
            }
            Some(v) if v < 0.0 => {
                losses += 1;
                loss_total += v;
            }
            _ => {}
        }
    }

    if wins == 0 || losses == 0 {
        return None;
    }

    let denominator = match basis {
        WinRateBasis::FullSeries => n,
        WinRateBasis::InSample => split,
    };
    let p = wins as f64 / denominator as f64;
    let payoff = (win_total / wins as f64) / (loss_total / losses as f64).abs();

    Some(p * (payoff + 1.0) - 1.0 / payoff)
}

/// Parameters shared by every performance summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryParams {
    pub drawdown_window: usize,
    pub sample_fraction: f64,
    pub win_rate_basis: WinRateBasis,
}

impl Default for SummaryParams {
    fn default() -> Self {
        SummaryParams {
            drawdown_window: 252,
            sample_fraction: 0.6,
            win_rate_basis: WinRateBasis::FullSeries,
        }
    }
}

/// Aggregated performance of one strategy run.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub curve: IndicatorSeries,
    pub rolling_peak: IndicatorSeries,
    pub drawdown: IndicatorSeries,
    pub max_drawdown_series: IndicatorSeries,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub optimal_f: Option<f64>,
}

impl PerformanceSummary {
    /// Summarize a per-period log-return series; the value curve is the
    /// compounded unit investment.
    pub fn from_log_returns(returns: &IndicatorSeries, params: &SummaryParams) -> Self {
        let curve = compound(&cumulative_sum(returns));
        Self::compute(returns, curve, params)
    }

    /// Summarize an explicit value curve, with `step_returns` feeding the
    /// optimal-f estimate (per-period returns or PnL).
    pub fn compute(
        step_returns: &IndicatorSeries,
        curve: IndicatorSeries,
        params: &SummaryParams,
    ) -> Self {
        let rolling_peak = rolling_max(&curve, params.drawdown_window);
        let dd = drawdown(&curve, &rolling_peak);
        let max_dd = max_drawdown(&dd, params.drawdown_window);

        let first = curve.points.iter().find_map(|p| p.value);
        let last = curve.points.iter().rev().find_map(|p| p.value);
        let total_return = match (first, last) {
            (Some(first), Some(last)) if first > 0.0 => last / first - 1.0,
            _ => 0.0,
        };

        let max_drawdown = dd
            .points
            .iter()
            .filter_map(|p| p.value)
            .reduce(f64::min)
            .unwrap_or(0.0);

        let optimal_f = optimal_f(step_returns, params.sample_fraction, params.win_rate_basis);

        PerformanceSummary {
            curve,
            rolling_peak,
            drawdown: dd,
            max_drawdown_series: max_dd,
            total_return,
            max_drawdown,
            optimal_f,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn series(values: &[f64]) -> TimeSeries {
        let dates: Vec<NaiveDate> = (1..=values.len() as u32)
            .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
            .collect();
        TimeSeries::from_parts(&dates, values)
    }

    fn curve(values: &[Option<f64>]) -> IndicatorSeries {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| IndicatorPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).unwrap(),
                value,
            })
            .collect();
        IndicatorSeries {
            kind: IndicatorKind::ValueCurve,
            points,
        }
    }

    fn returns(values: &[Option<f64>]) -> IndicatorSeries {
        IndicatorSeries {
            kind: IndicatorKind::StrategyReturn,
            ..curve(values)
        }
    }

    #[test]
    fn rolling_max_expands_then_slides() {
        let peak = rolling_max(
            &curve(&[Some(1.0), Some(3.0), Some(2.0), Some(5.0), Some(4.0)]),
            2,
        );
        let values: Vec<Option<f64>> = peak.points.iter().map(|p| p.value).collect();
        assert_eq!(
            values,
            vec![Some(1.0), Some(3.0), Some(3.0), Some(5.0), Some(5.0)]
        );
    }

    #[test]
    fn rolling_max_forgets_peaks_outside_the_window() {
        let peak = rolling_max(&curve(&[Some(9.0), Some(1.0), Some(2.0)]), 2);
        assert_eq!(peak.value(2), Some(2.0));
    }

    #[test]
    fn rolling_max_skips_undefined() {
        let peak = rolling_max(&curve(&[None, Some(2.0), Some(1.0)]), 3);
        assert_eq!(peak.value(0), None);
        assert_eq!(peak.value(1), Some(2.0));
        assert_eq!(peak.value(2), Some(2.0));
    }

    #[test]
    #[should_panic(expected = "window must be positive")]
    fn rolling_max_zero_window_panics() {
        rolling_max(&curve(&[Some(1.0)]), 0);
    }

    #[test]
    fn drawdown_from_peak() {
        let c = curve(&[Some(100.0), Some(110.0), Some(99.0), Some(121.0)]);
        let dd = drawdown(&c, &rolling_max(&c, 252));
        assert_relative_eq!(dd.value(0).unwrap(), 0.0);
        assert_relative_eq!(dd.value(1).unwrap(), 0.0);
        assert_relative_eq!(dd.value(2).unwrap(), -0.1, max_relative = 1e-12);
        assert_relative_eq!(dd.value(3).unwrap(), 0.0);
    }

    #[test]
    fn drawdown_undefined_at_zero_peak() {
        let c = curve(&[Some(0.0), Some(1.0)]);
        let dd = drawdown(&c, &rolling_max(&c, 252));
        assert_eq!(dd.value(0), None);
        assert_relative_eq!(dd.value(1).unwrap(), 0.0);
    }

    #[test]
    fn max_drawdown_expands_then_slides() {
        let c = curve(&[Some(100.0), Some(50.0), Some(80.0), Some(90.0)]);
        let dd = drawdown(&c, &rolling_max(&c, 252));
        let worst = max_drawdown(&dd, 252);
        assert_relative_eq!(worst.value(1).unwrap(), -0.5);
        assert_relative_eq!(worst.value(3).unwrap(), -0.5);
    }

    #[test]
    fn max_drawdown_forgets_troughs_outside_the_window() {
        // Drawdowns [0, -0.5, 0, 0, 0]: with window 2 the halving at
        // index 1 drops out of the window from index 3 onwards.
        let c = curve(&[Some(100.0), Some(50.0), Some(100.0), Some(100.0), Some(100.0)]);
        let dd = drawdown(&c, &rolling_max(&c, 252));
        let worst = max_drawdown(&dd, 2);
        assert_relative_eq!(worst.value(1).unwrap(), -0.5);
        assert_relative_eq!(worst.value(2).unwrap(), -0.5);
        assert_relative_eq!(worst.value(3).unwrap(), 0.0);
        assert_relative_eq!(worst.value(4).unwrap(), 0.0);
    }

    #[test]
    #[should_panic(expected = "window must be positive")]
    fn max_drawdown_zero_window_panics() {
        max_drawdown(&curve(&[Some(1.0)]), 0);
    }

    #[test]
    fn correlation_of_identical_series_is_one() {
        let a = series(&[1.0, 2.0, 3.0, 4.0]);
        assert_relative_eq!(correlation(&a, &a).unwrap(), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn correlation_of_opposite_series_is_minus_one() {
        let a = series(&[1.0, 2.0, 3.0]);
        let b = series(&[3.0, 2.0, 1.0]);
        assert_relative_eq!(correlation(&a, &b).unwrap(), -1.0, max_relative = 1e-12);
    }

    #[test]
    fn correlation_undefined_for_flat_series() {
        let a = series(&[1.0, 2.0, 3.0]);
        let b = series(&[5.0, 5.0, 5.0]);
        assert_eq!(correlation(&a, &b), None);
    }

    #[test]
    fn correlation_undefined_for_single_point() {
        let a = series(&[1.0]);
        assert_eq!(correlation(&a, &a), None);
    }

    #[test]
    fn optimal_f_known_profile() {
        // 6 wins of 2.0 and 4 losses of -1.0: p = 0.6, payoff = 2.
        let mut values = vec![Some(2.0); 6];
        values.extend(vec![Some(-1.0); 4]);
        let f = optimal_f(&returns(&values), 1.0, WinRateBasis::FullSeries).unwrap();
        assert_relative_eq!(f, 1.3, max_relative = 1e-12);
    }

    #[test]
    fn optimal_f_basis_changes_denominator() {
        // In-sample half: 3 wins of 1.0, 2 losses of -1.0; payoff = 1.
        let values = vec![
            Some(1.0),
            Some(1.0),
            Some(1.0),
            Some(-1.0),
            Some(-1.0),
            Some(1.0),
            Some(1.0),
            Some(1.0),
            Some(1.0),
            Some(1.0),
        ];
        let full = optimal_f(&returns(&values), 0.5, WinRateBasis::FullSeries).unwrap();
        let in_sample = optimal_f(&returns(&values), 0.5, WinRateBasis::InSample).unwrap();
        assert_relative_eq!(full, -0.4, max_relative = 1e-12);
        assert_relative_eq!(in_sample, 0.2, max_relative = 1e-12);
    }

    #[test]
    fn optimal_f_none_without_losers() {
        let f = optimal_f(
            &returns(&[Some(1.0), Some(2.0)]),
            1.0,
            WinRateBasis::FullSeries,
        );
        assert_eq!(f, None);
    }

    #[test]
    fn optimal_f_only_sees_the_in_sample_slice() {
        // Winners exist only out of sample.
        let values = vec![Some(-1.0), Some(-1.0), Some(2.0), Some(2.0)];
        let f = optimal_f(&returns(&values), 0.5, WinRateBasis::FullSeries);
        assert_eq!(f, None);
    }

    #[test]
    fn optimal_f_undefined_points_count_toward_full_length() {
        let values = vec![None, Some(2.0), Some(2.0), Some(-1.0)];
        let f = optimal_f(&returns(&values), 1.0, WinRateBasis::FullSeries).unwrap();
        // p = 2/4, payoff = 2.
        assert_relative_eq!(f, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn win_rate_basis_parse() {
        assert_eq!(
            WinRateBasis::parse("full-series"),
            Some(WinRateBasis::FullSeries)
        );
        assert_eq!(WinRateBasis::parse("in-sample"), Some(WinRateBasis::InSample));
        assert_eq!(WinRateBasis::parse("kelly"), None);
    }

    #[test]
    fn summary_from_log_returns() {
        let r = 2.0_f64.ln();
        let rets = returns(&[None, Some(r), Some(-r)]);
        let summary = PerformanceSummary::from_log_returns(&rets, &SummaryParams::default());
        // Curve 1 → 2 → 1: flat overall, worst drawdown -50%.
        assert_relative_eq!(summary.total_return, 0.0, epsilon = 1e-12);
        assert_relative_eq!(summary.max_drawdown, -0.5, max_relative = 1e-12);
        assert_relative_eq!(summary.curve.value(1).unwrap(), 2.0, max_relative = 1e-12);
    }

    #[test]
    fn summary_windows_the_max_drawdown_series() {
        let c = curve(&[Some(100.0), Some(50.0), Some(100.0), Some(100.0), Some(100.0)]);
        let steps = returns(&[None, Some(-50.0), Some(50.0), Some(0.0), Some(0.0)]);
        let params = SummaryParams {
            drawdown_window: 2,
            ..SummaryParams::default()
        };
        let summary = PerformanceSummary::compute(&steps, c, &params);
        // The series forgets the halving once it leaves the window; the
        // scalar keeps the worst drawdown of the whole run.
        assert_relative_eq!(summary.max_drawdown_series.value(4).unwrap(), 0.0);
        assert_relative_eq!(summary.max_drawdown, -0.5, max_relative = 1e-12);
    }

    #[test]
    fn summary_total_return_on_value_curve() {
        let c = curve(&[Some(1000.0), Some(1100.0), Some(1210.0)]);
        let steps = returns(&[None, Some(100.0), Some(110.0)]);
        let summary = PerformanceSummary::compute(&steps, c, &SummaryParams::default());
        assert_relative_eq!(summary.total_return, 0.21, max_relative = 1e-12);
        assert_eq!(summary.optimal_f, None);
    }
}
