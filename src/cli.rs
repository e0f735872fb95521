//! CLI definition and dispatch.
//!
//! One subcommand per preset pipeline. Flags override config values and a
//! missing required ticker is prompted for on stdin. Progress goes to
//! stderr; the report goes through the report port.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::cache_adapter::CachingDataAdapter;
use crate::adapters::csv_adapter::CsvDataAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::backtest::{
    account_curve, cumulative_sum, log_returns, position_pnl, strategy_returns,
};
use crate::domain::error::SigbenchError;
use crate::domain::indicator::atr::vol_ratio;
use crate::domain::indicator::rsi::rsi;
use crate::domain::indicator::sma::sma;
use crate::domain::indicator::volatility::volatility;
use crate::domain::indicator::{diff, IndicatorKind, IndicatorSeries};
use crate::domain::metrics::{correlation, PerformanceSummary, SummaryParams, WinRateBasis};
use crate::domain::ohlcv::{OhlcvBar, PriceField};
use crate::domain::portfolio::{weighted_valuation, BasketComponent};
use crate::domain::position::Stance;
use crate::domain::report::RunReport;
use crate::domain::rule::distance::DistanceRule;
use crate::domain::rule::gate::trailing_gate;
use crate::domain::rule::ma_cross::ma_cross;
use crate::domain::rule::pyramid::{evaluate_pyramid, PyramidProfile, TrendWindow};
use crate::domain::rule::reversion::ReversionRule;
use crate::domain::rule::sizing::{size_positions, SizingConfig, SizingPolicy};
use crate::domain::rule::threshold::ThresholdRule;
use crate::domain::series::TimeSeries;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "sigbench", about = "Signal generation and backtest accounting for daily bars")]
pub struct Cli {
    /// Path to the INI configuration file
    #[arg(short, long, global = true, default_value = "sigbench.ini")]
    pub config: PathBuf,
    /// Report destination ("-" for stdout)
    #[arg(short, long, global = true, default_value = "-")]
    pub output: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Moving-average cross strategy on open prices
    SmaCross {
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long)]
        fast: Option<usize>,
        #[arg(long)]
        slow: Option<usize>,
    },
    /// RSI threshold-crossing strategy on open prices
    Rsi {
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long)]
        window: Option<usize>,
    },
    /// Volatility-ratio threshold strategy on daily ranges
    VolRatio {
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long)]
        window: Option<usize>,
    },
    /// Trade the spread between an index and its best-correlated constituent
    Pairs {
        #[arg(long)]
        index: Option<String>,
        /// Comma-separated candidate constituents
        #[arg(long)]
        candidates: Option<String>,
    },
    /// Mean-reversion strategy with a trailing performance gate
    Reversion {
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long)]
        delta: Option<f64>,
    },
    /// Staged trend-following sweep: trend window x profile x sizing policy
    Pyramid {
        /// Comma-separated tickers
        #[arg(long)]
        tickers: Option<String>,
    },
    /// Equal-weight basket valuation
    Basket {
        /// Comma-separated tickers
        #[arg(long)]
        tickers: Option<String>,
        #[arg(long)]
        investment: Option<f64>,
    },
    /// List tickers available in the data directory
    ListTickers,
    /// Show the stored data range for ticker(s)
    Info {
        #[arg(long)]
        ticker: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match dispatch(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn dispatch(cli: &Cli) -> Result<(), SigbenchError> {
    eprintln!("Loading config from {}", cli.config.display());
    let config = FileConfigAdapter::from_file(&cli.config)?;
    let (start, end) = date_range(&config)?;
    let params = summary_params(&config)?;

    let data_dir = PathBuf::from(
        config
            .get_string("data", "dir")
            .unwrap_or_else(|| "./data".to_string()),
    );
    let plain;
    let cached;
    let data_port: &dyn MarketDataPort = match config.get_string("data", "cache_dir") {
        Some(cache_dir) => {
            cached = CachingDataAdapter::new(
                CsvDataAdapter::new(data_dir),
                PathBuf::from(cache_dir),
            );
            &cached
        }
        None => {
            plain = CsvDataAdapter::new(data_dir);
            &plain
        }
    };

    let report = match &cli.command {
        Command::SmaCross { ticker, fast, slow } => {
            let ticker = resolve_ticker(ticker.as_deref(), &config)?;
            let fast = window_param(*fast, &config, "sma-cross", "fast_window", 50)?;
            let slow = window_param(*slow, &config, "sma-cross", "slow_window", 200)?;
            run_sma_cross(data_port, &ticker, start, end, fast, slow, &params)?
        }
        Command::Rsi { ticker, window } => {
            let ticker = resolve_ticker(ticker.as_deref(), &config)?;
            let window = window_param(*window, &config, "rsi", "window", 14)?;
            let upper = config.get_double("rsi", "upper", 69.0)?;
            let lower = config.get_double("rsi", "lower", 30.0)?;
            run_rsi(data_port, &ticker, start, end, window, upper, lower, &params)?
        }
        Command::VolRatio { ticker, window } => {
            let ticker = resolve_ticker(ticker.as_deref(), &config)?;
            let window = window_param(*window, &config, "vol-ratio", "window", 5)?;
            let upper = config.get_double("vol-ratio", "upper", 1.4)?;
            let lower = config.get_double("vol-ratio", "lower", 0.4)?;
            let vol_window = window_param(None, &config, "vol-ratio", "vol_window", 252)?;
            run_vol_ratio(
                data_port, &ticker, start, end, window, upper, lower, vol_window, &params,
            )?
        }
        Command::Pairs { index, candidates } => {
            let index_ticker = match index.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                Some(t) => t.to_uppercase(),
                None => match config.get_string("pairs", "index") {
                    Some(t) => t.trim().to_uppercase(),
                    None => {
                        let line = prompt_line("Enter index ticker: ")?;
                        if line.is_empty() {
                            return Err(missing_ticker_error());
                        }
                        line.to_uppercase()
                    }
                },
            };
            let candidate_flag = candidates
                .clone()
                .or_else(|| config.get_string("pairs", "candidates"));
            let mut candidate_tickers = resolve_tickers(candidate_flag.as_deref(), &config)?;
            candidate_tickers.retain(|t| t != &index_ticker);
            let sma_window = window_param(None, &config, "pairs", "sma_window", 50)?;
            let threshold = config.get_double("pairs", "threshold", 0.0)?;
            run_pairs(
                data_port,
                &index_ticker,
                &candidate_tickers,
                start,
                end,
                sma_window,
                threshold,
                &params,
            )?
        }
        Command::Reversion { ticker, delta } => {
            let ticker = resolve_ticker(ticker.as_deref(), &config)?;
            let delta = match delta {
                Some(d) => *d,
                None => config.get_double("reversion", "delta", 0.005)?,
            };
            let gate_window = window_param(None, &config, "reversion", "gate_window", 200)?;
            run_reversion(data_port, &ticker, start, end, delta, gate_window, &params)?
        }
        Command::Pyramid { tickers } => {
            let tickers = resolve_tickers(tickers.as_deref(), &config)?;
            let sizing = SizingConfig {
                aum: config.get_double("pyramid", "aum", 1_000_000.0)?,
                risk_fraction: config.get_double("pyramid", "risk_fraction", 0.20)?,
                instruments: window_param(None, &config, "pyramid", "instruments", 10)?,
            };
            let pnl_fraction = config.get_double("pyramid", "pnl_fraction", 0.5)?;
            run_pyramid(
                data_port,
                &tickers,
                start,
                end,
                &sizing,
                pnl_fraction,
                &params,
            )?
        }
        Command::Basket {
            tickers,
            investment,
        } => {
            let tickers = resolve_tickers(tickers.as_deref(), &config)?;
            let investment = match investment {
                Some(v) => *v,
                None => config.get_double("basket", "investment", 10_000.0)?,
            };
            run_basket(data_port, &tickers, start, end, investment, &params)?
        }
        Command::ListTickers => return run_list_tickers(data_port),
        Command::Info { ticker } => {
            let tickers = resolve_tickers(ticker.as_deref(), &config)?;
            return run_info(data_port, &tickers);
        }
    };

    TextReportAdapter::new().write(&report, &cli.output)?;
    eprintln!(
        "Report written to {}",
        if cli.output == "-" {
            "stdout"
        } else {
            &cli.output
        }
    );
    Ok(())
}

fn date_range(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), SigbenchError> {
    let start = match config.get_string("data", "start") {
        Some(raw) => parse_date(&raw, "start")?,
        None => NaiveDate::MIN,
    };
    let end = match config.get_string("data", "end") {
        Some(raw) => parse_date(&raw, "end")?,
        None => NaiveDate::MAX,
    };
    if start > end {
        return Err(SigbenchError::ConfigInvalid {
            section: "data".to_string(),
            key: "end".to_string(),
            reason: format!("end date {} precedes start date {}", end, start),
        });
    }
    Ok((start, end))
}

fn parse_date(raw: &str, key: &str) -> Result<NaiveDate, SigbenchError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| SigbenchError::ConfigInvalid {
        section: "data".to_string(),
        key: key.to_string(),
        reason: "invalid date format (expected YYYY-MM-DD)".to_string(),
    })
}

pub fn summary_params(config: &dyn ConfigPort) -> Result<SummaryParams, SigbenchError> {
    let defaults = SummaryParams::default();
    let drawdown_window = window_param(
        None,
        config,
        "engine",
        "drawdown_window",
        defaults.drawdown_window as i64,
    )?;
    if drawdown_window == 0 {
        return Err(SigbenchError::ConfigInvalid {
            section: "engine".to_string(),
            key: "drawdown_window".to_string(),
            reason: "window must be positive".to_string(),
        });
    }
    let sample_fraction = config.get_double("engine", "sample_fraction", defaults.sample_fraction)?;
    if !(0.0..=1.0).contains(&sample_fraction) {
        return Err(SigbenchError::ConfigInvalid {
            section: "engine".to_string(),
            key: "sample_fraction".to_string(),
            reason: format!("expected a fraction in [0, 1], got {}", sample_fraction),
        });
    }
    let win_rate_basis = match config.get_string("engine", "win_rate_basis") {
        Some(name) => {
            WinRateBasis::parse(&name).ok_or_else(|| SigbenchError::ConfigInvalid {
                section: "engine".to_string(),
                key: "win_rate_basis".to_string(),
                reason: format!("unknown basis {:?} (expected full-series or in-sample)", name),
            })?
        }
        None => defaults.win_rate_basis,
    };
    Ok(SummaryParams {
        drawdown_window,
        sample_fraction,
        win_rate_basis,
    })
}

fn window_param(
    flag: Option<usize>,
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<usize, SigbenchError> {
    let value = match flag {
        Some(v) => return Ok(v),
        None => config.get_int(section, key, default)?,
    };
    usize::try_from(value).map_err(|_| SigbenchError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("expected a non-negative integer, got {}", value),
    })
}

pub fn split_tickers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn missing_ticker_error() -> SigbenchError {
    SigbenchError::ConfigInvalid {
        section: "data".to_string(),
        key: "tickers".to_string(),
        reason: "no ticker provided".to_string(),
    }
}

fn prompt_line(prompt: &str) -> Result<String, SigbenchError> {
    eprint!("{}", prompt);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Single ticker: flag, first configured ticker, then a stdin prompt.
pub fn resolve_ticker(
    flag: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<String, SigbenchError> {
    if let Some(t) = flag {
        let t = t.trim().to_uppercase();
        if !t.is_empty() {
            return Ok(t);
        }
    }
    if let Some(raw) = config.get_string("data", "tickers") {
        if let Some(first) = split_tickers(&raw).into_iter().next() {
            return Ok(first);
        }
    }
    let line = prompt_line("Enter ticker: ")?;
    if line.is_empty() {
        return Err(missing_ticker_error());
    }
    Ok(line.to_uppercase())
}

/// Ticker list: flag, configured tickers, then a stdin prompt.
pub fn resolve_tickers(
    flag: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, SigbenchError> {
    if let Some(raw) = flag {
        let tickers = split_tickers(raw);
        if !tickers.is_empty() {
            return Ok(tickers);
        }
    }
    if let Some(raw) = config.get_string("data", "tickers") {
        let tickers = split_tickers(&raw);
        if !tickers.is_empty() {
            return Ok(tickers);
        }
    }
    let line = prompt_line("Enter tickers (comma separated): ")?;
    let tickers = split_tickers(&line);
    if tickers.is_empty() {
        return Err(missing_ticker_error());
    }
    Ok(tickers)
}

fn fetch_bars(
    data_port: &dyn MarketDataPort,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<OhlcvBar>, SigbenchError> {
    let bars = data_port.fetch_ohlcv(ticker, start, end)?;
    if bars.is_empty() {
        return Err(SigbenchError::NoData {
            ticker: ticker.to_string(),
        });
    }
    eprintln!("Loaded {} bars for {}", bars.len(), ticker);
    Ok(bars)
}

/// Fetch every ticker, skipping unusable ones with a warning. Errors only
/// when no usable ticker remains.
fn fetch_universe(
    data_port: &dyn MarketDataPort,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<(String, Vec<OhlcvBar>)>, SigbenchError> {
    let mut universe = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        match data_port.fetch_ohlcv(ticker, start, end) {
            Ok(bars) if !bars.is_empty() => universe.push((ticker.clone(), bars)),
            Ok(_) => eprintln!("warning: skipping {} (no bars in range)", ticker),
            Err(e) => eprintln!("warning: skipping {} ({})", ticker, e),
        }
    }
    if universe.is_empty() {
        return Err(SigbenchError::UniverseEmpty);
    }
    eprintln!("Loaded {} of {} tickers", universe.len(), tickers.len());
    Ok(universe)
}

pub fn run_sma_cross(
    data_port: &dyn MarketDataPort,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    fast: usize,
    slow: usize,
    params: &SummaryParams,
) -> Result<RunReport, SigbenchError> {
    if fast == 0 || slow == 0 || fast >= slow {
        return Err(SigbenchError::RuleInvalid {
            reason: format!(
                "fast window {} must be positive and smaller than slow window {}",
                fast, slow
            ),
        });
    }

    let bars = fetch_bars(data_port, ticker, start, end)?;
    let opens = PriceField::Open.series(&bars);
    let fast_ma = sma(&opens, fast);
    let slow_ma = sma(&opens, slow);
    let positions = ma_cross(&fast_ma, &slow_ma);
    let market = log_returns(&opens);
    let strat = strategy_returns(&positions, &market);
    let summary = PerformanceSummary::from_log_returns(&strat, params);

    let mut report = RunReport::new(&format!("sma-cross {}", ticker));
    report.add_param("ticker", ticker);
    report.add_param("bars", bars.len());
    report.add_param("fast window", fast);
    report.add_param("slow window", slow);
    report.add_param("position changes", positions.transitions());
    report.add_section("strategy", summary);
    Ok(report)
}

pub fn run_rsi(
    data_port: &dyn MarketDataPort,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    window: usize,
    upper: f64,
    lower: f64,
    params: &SummaryParams,
) -> Result<RunReport, SigbenchError> {
    if window == 0 {
        return Err(SigbenchError::RuleInvalid {
            reason: "RSI window must be positive".to_string(),
        });
    }
    if upper <= lower {
        return Err(SigbenchError::RuleInvalid {
            reason: format!("upper threshold {} must exceed lower {}", upper, lower),
        });
    }

    let bars = fetch_bars(data_port, ticker, start, end)?;
    let opens = PriceField::Open.series(&bars);
    let indicator = rsi(&opens, window);
    let rule = ThresholdRule {
        upper,
        lower,
        on_upper: Stance::Long,
        on_lower: Stance::Short,
    };
    let positions = rule.evaluate(&indicator);
    let market = log_returns(&opens);
    let strat = strategy_returns(&positions, &market);
    let summary = PerformanceSummary::from_log_returns(&strat, params);

    let mut report = RunReport::new(&format!("rsi {}", ticker));
    report.add_param("ticker", ticker);
    report.add_param("bars", bars.len());
    report.add_param("rsi window", window);
    report.add_param("upper threshold", upper);
    report.add_param("lower threshold", lower);
    report.add_param("position changes", positions.transitions());
    report.add_section("strategy", summary);
    Ok(report)
}

pub fn run_vol_ratio(
    data_port: &dyn MarketDataPort,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    window: usize,
    upper: f64,
    lower: f64,
    vol_window: usize,
    params: &SummaryParams,
) -> Result<RunReport, SigbenchError> {
    if window < 2 {
        return Err(SigbenchError::RuleInvalid {
            reason: format!("volatility ratio window must be at least 2, got {}", window),
        });
    }
    if upper <= lower {
        return Err(SigbenchError::RuleInvalid {
            reason: format!("upper threshold {} must exceed lower {}", upper, lower),
        });
    }
    if vol_window == 0 {
        return Err(SigbenchError::RuleInvalid {
            reason: "volatility window must be positive".to_string(),
        });
    }

    let bars = fetch_bars(data_port, ticker, start, end)?;
    let ratio = vol_ratio(&bars, window);
    let rule = ThresholdRule {
        upper,
        lower,
        on_upper: Stance::Long,
        on_lower: Stance::Flat,
    };
    let positions = rule.evaluate(&ratio);
    let closes = PriceField::Close.series(&bars);
    let market = log_returns(&closes);
    let strat = strategy_returns(&positions, &market);
    let summary = PerformanceSummary::from_log_returns(&strat, params);

    let mut report = RunReport::new(&format!("vol-ratio {}", ticker));
    report.add_param("ticker", ticker);
    report.add_param("bars", bars.len());
    report.add_param("ratio window", window);
    report.add_param("upper threshold", upper);
    report.add_param("lower threshold", lower);
    report.add_param("position changes", positions.transitions());
    match volatility(&closes, vol_window).points.iter().rev().find_map(|p| p.value) {
        Some(v) => report.add_param(
            &format!("annualized volatility ({}d)", vol_window),
            format!("{:.2}%", v * 100.0),
        ),
        None => report.add_param(
            &format!("annualized volatility ({}d)", vol_window),
            "undefined",
        ),
    }
    report.add_section("strategy", summary);
    Ok(report)
}

pub fn run_pairs(
    data_port: &dyn MarketDataPort,
    index_ticker: &str,
    candidates: &[String],
    start: NaiveDate,
    end: NaiveDate,
    sma_window: usize,
    threshold: f64,
    params: &SummaryParams,
) -> Result<RunReport, SigbenchError> {
    if sma_window == 0 {
        return Err(SigbenchError::RuleInvalid {
            reason: "spread average window must be positive".to_string(),
        });
    }
    if threshold < 0.0 {
        return Err(SigbenchError::RuleInvalid {
            reason: format!("distance threshold must be non-negative, got {}", threshold),
        });
    }

    let index_bars = fetch_bars(data_port, index_ticker, start, end)?;
    let index_closes = PriceField::Close.series(&index_bars);

    let mut best: Option<(String, TimeSeries, f64)> = None;
    for ticker in candidates {
        let bars = match data_port.fetch_ohlcv(ticker, start, end) {
            Ok(bars) if !bars.is_empty() => bars,
            Ok(_) => {
                eprintln!("warning: skipping {} (no bars in range)", ticker);
                continue;
            }
            Err(e) => {
                eprintln!("warning: skipping {} ({})", ticker, e);
                continue;
            }
        };
        let closes = PriceField::Close.series(&bars);
        let aligned =
            closes.len() == index_closes.len() && closes.dates().eq(index_closes.dates());
        if !aligned {
            eprintln!(
                "warning: skipping {} (dates differ from {})",
                ticker, index_ticker
            );
            continue;
        }
        let corr = match correlation(&index_closes, &closes) {
            Some(c) => c,
            None => {
                eprintln!("warning: skipping {} (degenerate correlation)", ticker);
                continue;
            }
        };
        eprintln!("  {}: correlation {:.4}", ticker, corr);
        let better = match &best {
            Some((_, _, b)) => corr.abs() > b.abs(),
            None => true,
        };
        if better {
            best = Some((ticker.clone(), closes, corr));
        }
    }
    let (chosen, chosen_closes, corr) = best.ok_or(SigbenchError::UniverseEmpty)?;
    eprintln!("Selected {} (correlation {:.4})", chosen, corr);

    let dates: Vec<NaiveDate> = index_closes.dates().collect();
    let spread_values: Vec<f64> = (0..index_closes.len())
        .map(|i| index_closes.value(i) - chosen_closes.value(i))
        .collect();
    let spread = TimeSeries::from_parts(&dates, &spread_values);
    let spread_ma = sma(&spread, sma_window);
    let rule = DistanceRule { threshold };
    let positions = rule.evaluate(&spread, &spread_ma);
    let market = log_returns(&spread);
    let strat = strategy_returns(&positions, &market);
    let summary = PerformanceSummary::from_log_returns(&strat, params);

    let mut report = RunReport::new(&format!("pairs {}/{}", index_ticker, chosen));
    report.add_param("index", index_ticker);
    report.add_param("constituent", chosen);
    report.add_param("correlation", format!("{:.4}", corr));
    report.add_param("spread sma window", sma_window);
    report.add_param("distance threshold", threshold);
    report.add_param("position changes", positions.transitions());
    report.add_section("strategy", summary);
    Ok(report)
}

pub fn run_reversion(
    data_port: &dyn MarketDataPort,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    delta: f64,
    gate_window: usize,
    params: &SummaryParams,
) -> Result<RunReport, SigbenchError> {
    if delta < 0.0 {
        return Err(SigbenchError::RuleInvalid {
            reason: format!("reversion delta must be non-negative, got {}", delta),
        });
    }
    if gate_window == 0 {
        return Err(SigbenchError::RuleInvalid {
            reason: "gate window must be positive".to_string(),
        });
    }

    let bars = fetch_bars(data_port, ticker, start, end)?;
    let opens = PriceField::Open.series(&bars);
    let moves = diff(&opens);
    let rule = ReversionRule { delta };
    let raw = rule.evaluate(&moves);
    let market = log_returns(&opens);
    let raw_returns = strategy_returns(&raw, &market);
    let raw_summary = PerformanceSummary::from_log_returns(&raw_returns, params);

    let gated = trailing_gate(&raw, &raw_returns, gate_window);
    let gated_returns = strategy_returns(&gated, &market);
    let gated_summary = PerformanceSummary::from_log_returns(&gated_returns, params);

    let mut report = RunReport::new(&format!("reversion {}", ticker));
    report.add_param("ticker", ticker);
    report.add_param("bars", bars.len());
    report.add_param("delta", delta);
    report.add_param("gate window", gate_window);
    report.add_param("raw position changes", raw.transitions());
    report.add_param("gated position changes", gated.transitions());
    report.add_section("raw", raw_summary);
    report.add_section("gated", gated_summary);
    Ok(report)
}

pub fn run_pyramid(
    data_port: &dyn MarketDataPort,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
    sizing: &SizingConfig,
    pnl_fraction: f64,
    params: &SummaryParams,
) -> Result<RunReport, SigbenchError> {
    if sizing.aum <= 0.0 || sizing.risk_fraction <= 0.0 {
        return Err(SigbenchError::RuleInvalid {
            reason: "AUM and risk fraction must be positive".to_string(),
        });
    }
    if sizing.instruments == 0 {
        return Err(SigbenchError::RuleInvalid {
            reason: "instrument count must be positive".to_string(),
        });
    }

    let universe = fetch_universe(data_port, tickers, start, end)?;
    let policies = [
        SizingPolicy::ConstantRisk,
        SizingPolicy::MarketMoney { pnl_fraction },
        SizingPolicy::RiskOrPrice,
    ];

    let mut report = RunReport::new("pyramid sweep");
    let names: Vec<&str> = universe.iter().map(|(t, _)| t.as_str()).collect();
    report.add_param("tickers", names.join(", "));
    report.add_param("aum", sizing.aum);
    report.add_param("risk fraction", sizing.risk_fraction);
    report.add_param("instruments", sizing.instruments);
    report.add_param("pnl fraction", pnl_fraction);

    for trend in TrendWindow::ALL {
        for profile in PyramidProfile::ALL {
            for &policy in &policies {
                eprintln!("Running {} {} {}", trend, profile, policy);
                for (ticker, bars) in &universe {
                    let pyramid = evaluate_pyramid(bars, trend, profile);
                    let units = size_positions(&pyramid, bars, policy, sizing);
                    let closes = PriceField::Close.series(bars);
                    let pnl = position_pnl(&units, &closes);
                    let curve = account_curve(&cumulative_sum(&pnl), sizing.aum);
                    let summary = PerformanceSummary::compute(&pnl, curve, params);
                    report.add_section(
                        &format!("{} {} {} {}", ticker, trend, profile, policy),
                        summary,
                    );
                }
            }
        }
    }
    Ok(report)
}

pub fn run_basket(
    data_port: &dyn MarketDataPort,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
    investment: f64,
    params: &SummaryParams,
) -> Result<RunReport, SigbenchError> {
    if investment <= 0.0 {
        return Err(SigbenchError::RuleInvalid {
            reason: format!("initial investment must be positive, got {}", investment),
        });
    }

    let universe = fetch_universe(data_port, tickers, start, end)?;
    let mut components: Vec<BasketComponent> = Vec::with_capacity(universe.len());
    for (ticker, bars) in &universe {
        let closes = PriceField::Close.series(bars);
        if let Some(first) = components.first() {
            let aligned =
                closes.len() == first.closes.len() && closes.dates().eq(first.closes.dates());
            if !aligned {
                eprintln!(
                    "warning: skipping {} (dates differ from {})",
                    ticker, first.ticker
                );
                continue;
            }
        }
        components.push(BasketComponent {
            ticker: ticker.clone(),
            closes,
        });
    }

    let weight = 1.0 / components.len() as f64;
    let weights = vec![weight; components.len()];
    let valuation = weighted_valuation(&components, &weights, investment)?;
    let step = log_returns(&valuation);
    let curve = IndicatorSeries::from_values(
        IndicatorKind::ValueCurve,
        &valuation,
        valuation.values().map(Some).collect(),
    );
    let summary = PerformanceSummary::compute(&step, curve, params);

    let mut report = RunReport::new("basket");
    let names: Vec<&str> = components.iter().map(|c| c.ticker.as_str()).collect();
    report.add_param("components", names.join(", "));
    report.add_param("initial investment", investment);
    report.add_param("weight per component", format!("{:.4}", weight));
    report.add_section("basket", summary);
    Ok(report)
}

fn run_list_tickers(data_port: &dyn MarketDataPort) -> Result<(), SigbenchError> {
    let tickers = data_port.list_tickers()?;
    if tickers.is_empty() {
        eprintln!("No tickers found");
    } else {
        for ticker in &tickers {
            println!("{}", ticker);
        }
        eprintln!("{} tickers found", tickers.len());
    }
    Ok(())
}

fn run_info(data_port: &dyn MarketDataPort, tickers: &[String]) -> Result<(), SigbenchError> {
    for ticker in tickers {
        match data_port.data_range(ticker) {
            Ok(Some((min_date, max_date, count))) => {
                println!("{}: {} bars, {} to {}", ticker, count, min_date, max_date);
            }
            Ok(None) => eprintln!("{}: no data found", ticker),
            Err(e) => eprintln!("error querying {}: {}", ticker, e),
        }
    }
    Ok(())
}
