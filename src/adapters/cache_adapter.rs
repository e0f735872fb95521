//! Snapshot-caching data adapter.
//!
//! Wraps another data source with a directory of per-ticker CSV snapshots.
//! A fetch consults the snapshot first; on a miss the full history is pulled
//! from the inner source, written back as the snapshot, then filtered to the
//! requested range. Nothing else assumes the snapshot directory exists.

use crate::adapters::csv_adapter::{parse_bars, write_bars};
use crate::domain::error::SigbenchError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct CachingDataAdapter<D> {
    inner: D,
    cache_dir: PathBuf,
}

impl<D: MarketDataPort> CachingDataAdapter<D> {
    pub fn new(inner: D, cache_dir: PathBuf) -> Self {
        Self { inner, cache_dir }
    }

    fn snapshot_path(&self, ticker: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.csv", ticker))
    }

    fn snapshot(&self, ticker: &str) -> Result<Option<Vec<OhlcvBar>>, SigbenchError> {
        let path = self.snapshot_path(ticker);
        match fs::read_to_string(&path) {
            Ok(content) => parse_bars(&content, ticker, &path).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SigbenchError::DataSource {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

impl<D: MarketDataPort> MarketDataPort for CachingDataAdapter<D> {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SigbenchError> {
        let mut bars = match self.snapshot(ticker)? {
            Some(bars) => bars,
            None => {
                let full = self
                    .inner
                    .fetch_ohlcv(ticker, NaiveDate::MIN, NaiveDate::MAX)?;
                fs::create_dir_all(&self.cache_dir)?;
                write_bars(&self.snapshot_path(ticker), &full)?;
                full
            }
        };
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        Ok(bars)
    }

    fn list_tickers(&self) -> Result<Vec<String>, SigbenchError> {
        self.inner.list_tickers()
    }

    fn data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SigbenchError> {
        match self.snapshot(ticker)? {
            Some(bars) if !bars.is_empty() => Ok(Some((
                bars[0].date,
                bars[bars.len() - 1].date,
                bars.len(),
            ))),
            Some(_) => Ok(None),
            None => self.inner.data_range(ticker),
        }
    }
}
