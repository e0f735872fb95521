//! Edge-triggered threshold crossing rule.
//!
//! Fires only at the transition step: value[t] beyond the threshold while
//! value[t-1] was not. Staying beyond the threshold does not re-fire. The
//! first step has no previous value and never fires, and undefined
//! indicator values take part in no crossing.

use chrono::NaiveDate;

use crate::domain::indicator::IndicatorSeries;
use crate::domain::position::{PositionSeries, Stance};

/// Crossing rule with configurable stances per edge. The volatility-ratio
/// strategy goes long above `upper` and flat below `lower`; the RSI strategy
/// goes long above and short below.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdRule {
    pub upper: f64,
    pub lower: f64,
    pub on_upper: Stance,
    pub on_lower: Stance,
}

impl ThresholdRule {
    pub fn evaluate(&self, indicator: &IndicatorSeries) -> PositionSeries {
        let dates: Vec<NaiveDate> = indicator.points.iter().map(|p| p.date).collect();
        let events: Vec<Option<Stance>> = (0..indicator.len())
            .map(|i| {
                if i == 0 {
                    return None;
                }
                let (curr, prev) = match (indicator.value(i), indicator.value(i - 1)) {
                    (Some(curr), Some(prev)) => (curr, prev),
                    _ => return None,
                };
                if curr > self.upper && prev <= self.upper {
                    Some(self.on_upper)
                } else if curr < self.lower && prev >= self.lower {
                    Some(self.on_lower)
                } else {
                    None
                }
            })
            .collect();
        PositionSeries::from_events(&dates, &events)
    }
}
