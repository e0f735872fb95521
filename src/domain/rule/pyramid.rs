//! Staged trend rule around an EMA band.
//!
//! Yesterday's close is compared against today's EMA with a band of half
//! today's true range. The four zones set a trade direction and advance a
//! bounded progress counter 0..4; a direction flip resets progress. The
//! deployed fraction of the full target size comes from a pyramid profile
//! table indexed by progress. Zone boundaries are exclusive; a close
//! sitting exactly on the average or a band edge falls into the outer buy
//! zone. No decision is taken at the first bar or while the EMA is still
//! warming up, and the stage fraction is 0 until the first decision.

use chrono::NaiveDate;
use std::fmt;

use crate::domain::indicator::atr::true_range;
use crate::domain::indicator::ema::ema;
use crate::domain::ohlcv::{OhlcvBar, PriceField};

/// How the deployed fraction grows with progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PyramidProfile {
    /// Most of the size up front, topped up as the trend confirms.
    Upright,
    /// Equal additions at every confirmation.
    Inverted,
    /// Full size after two confirmations, then scaled back out.
    Reflecting,
}

impl PyramidProfile {
    pub fn stage_fractions(&self) -> [f64; 5] {
        match self {
            PyramidProfile::Upright => [0.50, 0.75, 0.88, 0.95, 1.00],
            PyramidProfile::Inverted => [0.20, 0.40, 0.60, 0.80, 1.00],
            PyramidProfile::Reflecting => [0.60, 0.90, 1.00, 0.60, 0.0],
        }
    }

    pub const ALL: [PyramidProfile; 3] = [
        PyramidProfile::Upright,
        PyramidProfile::Inverted,
        PyramidProfile::Reflecting,
    ];
}

impl fmt::Display for PyramidProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PyramidProfile::Upright => write!(f, "upright"),
            PyramidProfile::Inverted => write!(f, "inverted"),
            PyramidProfile::Reflecting => write!(f, "reflecting"),
        }
    }
}

/// EMA length the trend is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendWindow {
    Ema21,
    Ema45,
}

impl TrendWindow {
    pub fn window(&self) -> usize {
        match self {
            TrendWindow::Ema21 => 21,
            TrendWindow::Ema45 => 45,
        }
    }

    pub const ALL: [TrendWindow; 2] = [TrendWindow::Ema21, TrendWindow::Ema45];
}

impl fmt::Display for TrendWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EMA({})", self.window())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyramidPoint {
    pub date: NaiveDate,
    pub direction: Option<Direction>,
    pub progress: u8,
    pub stage_fraction: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PyramidSeries {
    pub profile: PyramidProfile,
    pub points: Vec<PyramidPoint>,
}

impl PyramidSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub fn evaluate_pyramid(
    bars: &[OhlcvBar],
    trend: TrendWindow,
    profile: PyramidProfile,
) -> PyramidSeries {
    let closes = PriceField::Close.series(bars);
    let average = ema(&closes, trend.window());
    let ranges = true_range(bars);
    let stages = profile.stage_fractions();

    let mut direction: Option<Direction> = None;
    let mut progress: u8 = 0;
    let mut points = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            if let Some(avg) = average.value(i) {
                let yesterday = bars[i - 1].close;
                let band = 0.5 * ranges.value(i).unwrap_or(0.0);
                let (new_direction, new_progress) =
                    step(direction, progress, yesterday, avg, band);
                direction = Some(new_direction);
                progress = new_progress;
            }
        }
        let stage_fraction = if direction.is_some() {
            stages[progress as usize]
        } else {
            0.0
        };
        points.push(PyramidPoint {
            date: bar.date,
            direction,
            progress,
            stage_fraction,
        });
    }

    PyramidSeries { profile, points }
}

fn step(
    old: Option<Direction>,
    old_progress: u8,
    yesterday: f64,
    avg: f64,
    band: f64,
) -> (Direction, u8) {
    let advance = if old_progress < 4 {
        old_progress + 1
    } else {
        old_progress
    };

    if yesterday < avg - band {
        // Deep below trend: confirmation while selling, fresh start otherwise.
        let progress = if old == Some(Direction::Sell) { advance } else { 0 };
        (Direction::Sell, progress)
    } else if yesterday > avg - band && yesterday < avg {
        let progress = if old == Some(Direction::Buy) { 0 } else { advance };
        (Direction::Sell, progress)
    } else if yesterday > avg && yesterday < avg + band {
        let progress = if old == Some(Direction::Sell) { 0 } else { advance };
        (Direction::Buy, progress)
    } else {
        let progress = if old == Some(Direction::Buy) { advance } else { 0 };
        (Direction::Buy, progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_tables() {
        assert_eq!(
            PyramidProfile::Upright.stage_fractions(),
            [0.50, 0.75, 0.88, 0.95, 1.00]
        );
        assert_eq!(
            PyramidProfile::Inverted.stage_fractions(),
            [0.20, 0.40, 0.60, 0.80, 1.00]
        );
        assert_eq!(
            PyramidProfile::Reflecting.stage_fractions(),
            [0.60, 0.90, 1.00, 0.60, 0.0]
        );
    }

    #[test]
    fn sell_confirmation_advances() {
        let (dir, progress) = step(Some(Direction::Sell), 1, 90.0, 100.0, 2.0);
        assert_eq!(dir, Direction::Sell);
        assert_eq!(progress, 2);
    }

    #[test]
    fn progress_saturates_at_four() {
        let (_, progress) = step(Some(Direction::Sell), 4, 90.0, 100.0, 2.0);
        assert_eq!(progress, 4);
    }

    #[test]
    fn direction_flip_resets_progress() {
        // Deep below trend while buying: sell restart at 0.
        let (dir, progress) = step(Some(Direction::Buy), 3, 90.0, 100.0, 2.0);
        assert_eq!(dir, Direction::Sell);
        assert_eq!(progress, 0);

        // Deep above trend while selling: buy restart at 0.
        let (dir, progress) = step(Some(Direction::Sell), 3, 110.0, 100.0, 2.0);
        assert_eq!(dir, Direction::Buy);
        assert_eq!(progress, 0);
    }

    #[test]
    fn inner_zones_advance_against_the_old_trend() {
        // Just below the average while selling: still a sell confirmation.
        let (dir, progress) = step(Some(Direction::Sell), 0, 99.0, 100.0, 2.0);
        assert_eq!(dir, Direction::Sell);
        assert_eq!(progress, 1);

        // Just below the average while buying: sell restart.
        let (dir, progress) = step(Some(Direction::Buy), 2, 99.0, 100.0, 2.0);
        assert_eq!(dir, Direction::Sell);
        assert_eq!(progress, 0);

        // Just above the average while selling: buy restart.
        let (dir, progress) = step(Some(Direction::Sell), 2, 101.0, 100.0, 2.0);
        assert_eq!(dir, Direction::Buy);
        assert_eq!(progress, 0);
    }

    #[test]
    fn close_on_the_average_reads_outer_buy_zone() {
        let (dir, progress) = step(Some(Direction::Sell), 2, 100.0, 100.0, 2.0);
        assert_eq!(dir, Direction::Buy);
        assert_eq!(progress, 0);
    }

    #[test]
    fn first_decision_in_inner_zone_starts_at_one() {
        // No prior direction: the inner zones advance from 0 to 1, the
        // outer zones restart at 0.
        let (_, progress) = step(None, 0, 99.0, 100.0, 2.0);
        assert_eq!(progress, 1);
        let (_, progress) = step(None, 0, 90.0, 100.0, 2.0);
        assert_eq!(progress, 0);
    }

    #[test]
    fn no_decision_before_ema_exists() {
        let bars: Vec<OhlcvBar> = (1..=5)
            .map(|d| OhlcvBar {
                ticker: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0,
                volume: 1000,
            })
            .collect();
        let series = evaluate_pyramid(&bars, TrendWindow::Ema21, PyramidProfile::Upright);
        assert_eq!(series.len(), 5);
        assert!(series.points.iter().all(|p| p.direction.is_none()));
        assert!(series.points.iter().all(|p| p.stage_fraction == 0.0));
    }

    #[test]
    fn stage_fraction_follows_profile() {
        // 25 flat bars, then closes pinned above the band to ride buy
        // confirmations up the upright profile.
        let mut bars: Vec<OhlcvBar> = Vec::new();
        for d in 0..30 {
            let close = if d < 22 { 100.0 } else { 120.0 + d as f64 };
            bars.push(OhlcvBar {
                ticker: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(d),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000,
            });
        }
        let series = evaluate_pyramid(&bars, TrendWindow::Ema21, PyramidProfile::Upright);

        let last = series.points.last().unwrap();
        assert_eq!(last.direction, Some(Direction::Buy));
        assert_eq!(last.progress, 4);
        assert_eq!(last.stage_fraction, 1.00);
    }
}
