//! Market data access port trait.

use crate::domain::error::SigbenchError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait MarketDataPort {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SigbenchError>;

    fn list_tickers(&self) -> Result<Vec<String>, SigbenchError>;

    fn data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SigbenchError>;
}
