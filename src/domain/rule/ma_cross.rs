//! Moving-average cross rule.
//!
//! Level rule, re-evaluated every step: long while the fast average is
//! above the slow one, short otherwise. Fully defined once both averages
//! exist; flat during their warm-up.

use chrono::NaiveDate;

use crate::domain::indicator::IndicatorSeries;
use crate::domain::position::{PositionSeries, Stance};

pub fn ma_cross(fast: &IndicatorSeries, slow: &IndicatorSeries) -> PositionSeries {
    assert_eq!(
        fast.len(),
        slow.len(),
        "fast and slow averages must cover the same dates"
    );

    let dates: Vec<NaiveDate> = fast.points.iter().map(|p| p.date).collect();
    let events: Vec<Option<Stance>> = (0..fast.len())
        .map(|i| match (fast.value(i), slow.value(i)) {
            (Some(f), Some(s)) => Some(if f > s { Stance::Long } else { Stance::Short }),
            _ => None,
        })
        .collect();
    PositionSeries::from_events(&dates, &events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::{IndicatorKind, IndicatorSeries};
    use crate::domain::series::TimeSeries;

    fn indicator(window: usize, values: &[Option<f64>]) -> IndicatorSeries {
        let dates: Vec<NaiveDate> = (1..=values.len() as u32)
            .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
            .collect();
        let filler: Vec<f64> = vec![0.0; values.len()];
        IndicatorSeries::from_values(
            IndicatorKind::Sma(window),
            &TimeSeries::from_parts(&dates, &filler),
            values.to_vec(),
        )
    }

    #[test]
    fn flat_during_warmup() {
        let fast = indicator(2, &[None, Some(11.0), Some(12.0)]);
        let slow = indicator(3, &[None, None, Some(10.0)]);
        let pos = ma_cross(&fast, &slow);
        assert_eq!(
            pos.stances(),
            vec![Stance::Flat, Stance::Flat, Stance::Long]
        );
    }

    #[test]
    fn flips_at_the_cross() {
        let fast = indicator(2, &[Some(10.0), Some(12.0), Some(9.0), Some(8.0)]);
        let slow = indicator(3, &[Some(11.0), Some(11.0), Some(11.0), Some(11.0)]);
        let pos = ma_cross(&fast, &slow);
        assert_eq!(
            pos.stances(),
            vec![Stance::Short, Stance::Long, Stance::Short, Stance::Short]
        );
    }

    #[test]
    fn equal_averages_read_short() {
        let fast = indicator(2, &[Some(10.0)]);
        let slow = indicator(3, &[Some(10.0)]);
        let pos = ma_cross(&fast, &slow);
        assert_eq!(pos.stance(0), Stance::Short);
    }

    #[test]
    #[should_panic(expected = "same dates")]
    fn mismatched_lengths_panic() {
        let fast = indicator(2, &[Some(1.0), Some(2.0)]);
        let slow = indicator(3, &[Some(1.0)]);
        ma_cross(&fast, &slow);
    }
}
