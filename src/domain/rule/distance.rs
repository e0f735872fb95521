//! Pairs-style distance rule.
//!
//! Trades the distance between a spread and its moving average: short
//! beyond +threshold, long beyond -threshold, flat when the distance
//! changed sign since the previous step, otherwise hold. The sign-change
//! reset is checked first and overrides a beyond-threshold distance on the
//! same step.

use chrono::NaiveDate;

use crate::domain::indicator::IndicatorSeries;
use crate::domain::position::{PositionSeries, Stance};
use crate::domain::series::TimeSeries;

#[derive(Debug, Clone, Copy)]
pub struct DistanceRule {
    pub threshold: f64,
}

impl DistanceRule {
    pub fn evaluate(&self, spread: &TimeSeries, spread_ma: &IndicatorSeries) -> PositionSeries {
        assert_eq!(
            spread.len(),
            spread_ma.len(),
            "spread and its average must cover the same dates"
        );

        let distance: Vec<Option<f64>> = (0..spread.len())
            .map(|i| spread_ma.value(i).map(|ma| spread.value(i) - ma))
            .collect();

        let dates: Vec<NaiveDate> = spread.dates().collect();
        let events: Vec<Option<Stance>> = (0..distance.len())
            .map(|i| {
                let d = distance[i]?;
                let crossed_zero = i > 0
                    && matches!(distance[i - 1], Some(prev) if d * prev < 0.0);
                if crossed_zero {
                    Some(Stance::Flat)
                } else if d > self.threshold {
                    Some(Stance::Short)
                } else if d < -self.threshold {
                    Some(Stance::Long)
                } else {
                    None
                }
            })
            .collect();
        PositionSeries::from_events(&dates, &events)
    }
}
