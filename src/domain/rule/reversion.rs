//! Mean-reversion rule on one-step differences.
//!
//! Level rule: long when the difference falls to -delta or below, short
//! when it rises to +delta or above, flat inside the band. The long check
//! comes first, so with delta = 0 a flat difference reads long. Undefined
//! differences give no event. Combined with the standard one-step return
//! lag this trades today against yesterday's move.

use chrono::NaiveDate;

use crate::domain::indicator::IndicatorSeries;
use crate::domain::position::{PositionSeries, Stance};

#[derive(Debug, Clone, Copy)]
pub struct ReversionRule {
    pub delta: f64,
}

impl ReversionRule {
    pub fn evaluate(&self, diff: &IndicatorSeries) -> PositionSeries {
        let dates: Vec<NaiveDate> = diff.points.iter().map(|p| p.date).collect();
        let events: Vec<Option<Stance>> = diff
            .points
            .iter()
            .map(|p| {
                let d = p.value?;
                if d <= -self.delta {
                    Some(Stance::Long)
                } else if d >= self.delta {
                    Some(Stance::Short)
                } else {
                    Some(Stance::Flat)
                }
            })
            .collect();
        PositionSeries::from_events(&dates, &events)
    }
}
