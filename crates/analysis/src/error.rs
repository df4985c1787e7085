use thiserror::Error;

/// Caller-input failures. Insufficient data is not one of them; it is
/// reported as a flagged `TrendSummary`.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("reading {index}: unparsable timestamp {value:?}")]
    Timestamp { index: usize, value: String },

    #[error("malformed reading data: {0}")]
    Format(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
