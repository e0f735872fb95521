//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with the first SMA, then EMA[i] = v[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) points are undefined.

use crate::domain::indicator::{IndicatorKind, IndicatorSeries};
use crate::domain::series::TimeSeries;

pub fn ema(source: &TimeSeries, window: usize) -> IndicatorSeries {
    assert!(window > 0, "ema window must be positive");

    let mut values = Vec::with_capacity(source.len());
    let k = 2.0 / (window as f64 + 1.0);
    let mut current = 0.0;
    let mut sum = 0.0;

    for i in 0..source.len() {
        let v = source.value(i);
        if i + 1 < window {
            sum += v;
            values.push(None);
        } else if i + 1 == window {
            sum += v;
            current = sum / window as f64;
            values.push(Some(current));
        } else {
            current = v * k + current * (1.0 - k);
            values.push(Some(current));
        }
    }

    IndicatorSeries::from_values(IndicatorKind::Ema(window), source, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(values: &[f64]) -> TimeSeries {
        let dates: Vec<NaiveDate> = (1..=values.len() as u32)
            .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
            .collect();
        TimeSeries::from_parts(&dates, values)
    }

    #[test]
    fn ema_warmup() {
        let s = ema(&series(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3);
        assert_eq!(s.value(0), None);
        assert_eq!(s.value(1), None);
        assert!(s.value(2).is_some());
        assert!(s.value(3).is_some());
    }

    #[test]
    fn ema_seed_is_sma() {
        let s = ema(&series(&[10.0, 20.0, 30.0]), 3);
        let expected = (10.0 + 20.0 + 30.0) / 3.0;
        assert!((s.value(2).unwrap() - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_recursive_calculation() {
        let s = ema(&series(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3);

        let k = 2.0 / 4.0;
        let seed = (10.0 + 20.0 + 30.0) / 3.0;
        let ema_3 = 40.0 * k + seed * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        assert!((s.value(3).unwrap() - ema_3).abs() < f64::EPSILON);
        assert!((s.value(4).unwrap() - ema_4).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_window_one_is_identity() {
        let s = ema(&series(&[10.0, 20.0, 30.0]), 1);
        assert_eq!(s.value(0), Some(10.0));
        assert_eq!(s.value(1), Some(20.0));
        assert_eq!(s.value(2), Some(30.0));
    }

    #[test]
    fn ema_constant_series() {
        let s = ema(&series(&[100.0; 5]), 3);
        for i in 2..5 {
            assert!((s.value(i).unwrap() - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    #[should_panic(expected = "window must be positive")]
    fn ema_zero_window_panics() {
        ema(&series(&[1.0]), 0);
    }
}
