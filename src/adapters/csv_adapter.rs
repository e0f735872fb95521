//! CSV file data adapter.
//!
//! One `{TICKER}.csv` per ticker under the base directory, columns
//! date,open,high,low,close,volume. Rows may arrive unordered; bars are
//! sorted by date on load.

use crate::domain::error::SigbenchError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct CsvDataAdapter {
    base_path: PathBuf,
}

impl CsvDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    fn read_all(&self, ticker: &str) -> Result<Option<Vec<OhlcvBar>>, SigbenchError> {
        let path = self.csv_path(ticker);
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

impl MarketDataPort for CsvDataAdapter {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SigbenchError> {
        let Some(mut bars) = self.read_all(ticker)? else {
            return Err(SigbenchError::NoData {
                ticker: ticker.to_string(),
            });
        };
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        Ok(bars)
    }

    fn list_tickers(&self) -> Result<Vec<String>, SigbenchError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SigbenchError::DataSource {
            path: self.base_path.display().to_string(),
            reason: format!("failed to read directory: {}", e),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SigbenchError::DataSource {
                path: self.base_path.display().to_string(),
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(ticker) = name_str.strip_suffix(".csv") {
                tickers.push(ticker.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }

    fn data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SigbenchError> {
        let bars = match self.read_all(ticker)? {
            Some(bars) if !bars.is_empty() => bars,
            _ => return Ok(None),
        };
        Ok(Some((
            bars[0].date,
            bars[bars.len() - 1].date,
            bars.len(),
        )))
    }
}

/// Parse a whole CSV document into date-sorted bars.
pub(crate) fn parse_bars(
    content: &str,
    ticker: &str,
    path: &Path,
) -> Result<Vec<OhlcvBar>, SigbenchError> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut bars = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| SigbenchError::DataSource {
            path: path.display().to_string(),
            reason: format!("CSV parse error: {}", e),
        })?;

        let date = NaiveDate::parse_from_str(field(&record, 0, "date", path)?, "%Y-%m-%d")
            .map_err(|e| SigbenchError::DataSource {
                path: path.display().to_string(),
                reason: format!("invalid date: {}", e),
            })?;

        let volume: i64 =
            field(&record, 5, "volume", path)?
                .parse()
                .map_err(|e| SigbenchError::DataSource {
                    path: path.display().to_string(),
                    reason: format!("invalid volume value: {}", e),
                })?;

        bars.push(OhlcvBar {
            ticker: ticker.to_string(),
            date,
            open: number(&record, 1, "open", path)?,
            high: number(&record, 2, "high", path)?,
            low: number(&record, 3, "low", path)?,
            close: number(&record, 4, "close", path)?,
            volume,
        });
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

/// Write bars back out in the same column layout.
pub(crate) fn write_bars(path: &Path, bars: &[OhlcvBar]) -> Result<(), SigbenchError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| SigbenchError::DataSource {
        path: path.display().to_string(),
        reason: format!("failed to open for writing: {}", e),
    })?;

    wtr.write_record(["date", "open", "high", "low", "close", "volume"])
        .and_then(|_| {
            bars.iter().try_for_each(|bar| {
                wtr.write_record([
                    bar.date.format("%Y-%m-%d").to_string(),
                    bar.open.to_string(),
                    bar.high.to_string(),
                    bar.low.to_string(),
                    bar.close.to_string(),
                    bar.volume.to_string(),
                ])
            })
        })
        .map_err(|e| SigbenchError::DataSource {
            path: path.display().to_string(),
            reason: format!("CSV write error: {}", e),
        })?;

    wtr.flush()?;
    Ok(())
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
    path: &Path,
) -> Result<&'r str, SigbenchError> {
    record.get(index).ok_or_else(|| SigbenchError::DataSource {
        path: path.display().to_string(),
        reason: format!("missing {} column", name),
    })
}

fn number(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    path: &Path,
) -> Result<f64, SigbenchError> {
    field(record, index, name, path)?
        .parse()
        .map_err(|e| SigbenchError::DataSource {
            path: path.display().to_string(),
            reason: format!("invalid {} value: {}", name, e),
        })
}
