//! Core domain types and logic.

pub mod series;
pub mod ohlcv;
pub mod position;
pub mod portfolio;
pub mod indicator;
pub mod rule;
pub mod backtest;
pub mod metrics;
pub mod report;
pub mod error;
