//! Position rules: deterministic mappings from indicator series to
//! position series. Every rule is a pure function of current and past
//! indicator values.

pub mod threshold;
pub mod ma_cross;
pub mod distance;
pub mod reversion;
pub mod gate;
pub mod pyramid;
pub mod sizing;
