//! Domain error types.
//!
//! Only data-level failures live here. Programmer errors (zero windows,
//! mismatched series lengths) panic at the call site instead.

/// Top-level error type for sigbench.
#[derive(Debug, thiserror::Error)]
pub enum SigbenchError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error in {path}: {reason}")]
    DataSource { path: String, reason: String },

    #[error("invalid rule parameter: {reason}")]
    RuleInvalid { reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("unusable series for {ticker}: {reason}")]
    UnusableSeries { ticker: String, reason: String },

    #[error("no usable tickers remain")]
    UniverseEmpty,
}

impl From<&SigbenchError> for std::process::ExitCode {
    fn from(err: &SigbenchError) -> Self {
        let code: u8 = match err {
            SigbenchError::Io(_) => 1,
            SigbenchError::ConfigParse { .. } | SigbenchError::ConfigInvalid { .. } => 2,
            SigbenchError::DataSource { .. } => 3,
            SigbenchError::RuleInvalid { .. } => 4,
            SigbenchError::NoData { .. }
            | SigbenchError::UnusableSeries { .. }
            | SigbenchError::UniverseEmpty => 5,
        };
        std::process::ExitCode::from(code)
    }
}
