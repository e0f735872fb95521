//! Ordered daily value series.
//!
//! Dates are strictly increasing with no duplicates; construction checks the
//! invariant and a violation is a caller bug. Series are never mutated after
//! construction.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Immutable (date, value) series with strictly increasing dates.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    points: Vec<TimePoint>,
}

impl TimeSeries {
    /// Panics if the dates are not strictly increasing.
    pub fn new(points: Vec<TimePoint>) -> Self {
        for pair in points.windows(2) {
            assert!(
                pair[0].date < pair[1].date,
                "time series dates must be strictly increasing: {} then {}",
                pair[0].date,
                pair[1].date
            );
        }
        TimeSeries { points }
    }

    /// Build from parallel date and value slices. Panics on length mismatch
    /// or unordered dates.
    pub fn from_parts(dates: &[NaiveDate], values: &[f64]) -> Self {
        assert_eq!(
            dates.len(),
            values.len(),
            "dates and values must have equal length"
        );
        let points = dates
            .iter()
            .zip(values.iter())
            .map(|(&date, &value)| TimePoint { date, value })
            .collect();
        TimeSeries::new(points)
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn date(&self, index: usize) -> NaiveDate {
        self.points[index].date
    }

    pub fn value(&self, index: usize) -> f64 {
        self.points[index].value
    }

    pub fn first(&self) -> Option<&TimePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TimePoint> {
        self.points.last()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }
}
