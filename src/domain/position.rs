//! Discrete market stances and dated position series.
//!
//! Rules emit sparse per-step events (`Option<Stance>`); the series
//! materializes them with holding semantics: an undefined step keeps the
//! last emitted stance, and everything before the first event is flat.

use chrono::NaiveDate;

use crate::domain::series::{TimePoint, TimeSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    Long,
    Flat,
    Short,
}

impl Stance {
    pub fn weight(&self) -> f64 {
        match self {
            Stance::Long => 1.0,
            Stance::Flat => 0.0,
            Stance::Short => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionPoint {
    pub date: NaiveDate,
    pub stance: Stance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionSeries {
    pub points: Vec<PositionPoint>,
}

impl PositionSeries {
    /// Forward-fill rule events into a fully defined series.
    pub fn from_events(dates: &[NaiveDate], events: &[Option<Stance>]) -> Self {
        assert_eq!(
            dates.len(),
            events.len(),
            "events must cover the date domain"
        );
        let mut held = Stance::Flat;
        let points = dates
            .iter()
            .zip(events.iter())
            .map(|(&date, event)| {
                if let Some(stance) = event {
                    held = *stance;
                }
                PositionPoint { date, stance: held }
            })
            .collect();
        PositionSeries { points }
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

    pub fn stance(&self, index: usize) -> Stance {
        self.points[index].stance
    }

    pub fn stances(&self) -> Vec<Stance> {
        self.points.iter().map(|p| p.stance).collect()
    }

    /// Position weights {-1, 0, +1} as a value series.
    pub fn weights(&self) -> TimeSeries {
        TimeSeries::new(
            self.points
                .iter()
                .map(|p| TimePoint {
                    date: p.date,
                    value: p.stance.weight(),
                })
                .collect(),
        )
    }

    /// Number of steps whose stance differs from the previous step.
    pub fn transitions(&self) -> usize {
        self.points
            .windows(2)
            .filter(|pair| pair[0].stance != pair[1].stance)
            .count()
    }
}
